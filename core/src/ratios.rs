//! Ratio derivation — raw counts to per-capita, per-area and per-GRDP ratios.

use crate::{
    error::{AfiError, AfiResult},
    record::{RawField, RegionRecord},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedRatios {
    pub savings_per_capita:  f64,
    pub loans_per_capita:    f64,
    pub bank_per_area:       f64,
    /// Pawnshop + venture-capital + micro-finance branches per km².
    pub nonbank_per_area:    f64,
    pub atm_per_area:        f64,
    pub agent_per_area:      f64,
    /// Savings nominal / GRDP.
    pub deposit_ratio:       f64,
    /// Loan nominal / GRDP.
    pub loan_ratio:          f64,
}

impl DerivedRatios {
    /// Derive every ratio from a record.
    ///
    /// Fails with `DivisionDomain` when population, inhabited area or GRDP
    /// is not a finite value > 0, when any other field is not finite, or
    /// when a ratio overflows (e.g. a denormal denominator). Never returns
    /// inf or NaN.
    pub fn derive(record: &RegionRecord) -> AfiResult<Self> {
        for field in RawField::ALL {
            let value = record.get(field);
            if !value.is_finite() {
                return Err(AfiError::DivisionDomain { field: field.column_name(), value });
            }
        }

        let population = denominator(record, RawField::Population)?;
        let area       = denominator(record, RawField::InhabitedArea)?;
        let grdp       = denominator(record, RawField::Grdp)?;

        let nonbank = record.pawnshop_branches
            + record.venture_capital_branches
            + record.microfinance_branches;

        Ok(Self {
            savings_per_capita: ratio(record.savings_accounts, population, RawField::Population)?,
            loans_per_capita:   ratio(record.loan_accounts, population, RawField::Population)?,
            bank_per_area:      ratio(record.bank_branches, area, RawField::InhabitedArea)?,
            nonbank_per_area:   ratio(nonbank, area, RawField::InhabitedArea)?,
            atm_per_area:       ratio(record.atms, area, RawField::InhabitedArea)?,
            agent_per_area:     ratio(record.agents, area, RawField::InhabitedArea)?,
            deposit_ratio:      ratio(record.savings_nominal, grdp, RawField::Grdp)?,
            loan_ratio:         ratio(record.loan_nominal, grdp, RawField::Grdp)?,
        })
    }
}

fn denominator(record: &RegionRecord, field: RawField) -> AfiResult<f64> {
    let value = record.get(field);
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AfiError::DivisionDomain { field: field.column_name(), value })
    }
}

/// Overflow is blamed on the denominator.
fn ratio(numerator: f64, denominator: f64, field: RawField) -> AfiResult<f64> {
    let value = numerator / denominator;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AfiError::DivisionDomain { field: field.column_name(), value: denominator })
    }
}
