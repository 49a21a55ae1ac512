//! Composite index builder — D1, D2, D3 and AFI.
//!
//! Weights and loadings are fixed constants of the index (derived
//! externally by factor analysis). They are not configurable.
//!
//!   D1  = 0.7071·Z(savings/capita) + 0.7071·Z(loans/capita)
//!   D2  = Z(0.463·bank/km² + 0.167·ATM/km² + 0.074·agent/km² + 0.296·nonbank/km²)
//!   D3  = 0.7071·Z(deposit ratio) + 0.7071·Z(loan ratio)
//!   AFI = 0.5017·D1 + 0.6274·D2 + 0.3576·D3

use crate::{
    error::AfiResult,
    ratios::DerivedRatios,
    standardize::z_score,
    stats::ReferenceStatistics,
};
use serde::{Deserialize, Serialize};

pub const ACCESS_WEIGHT: f64 = 0.7071;
pub const USAGE_WEIGHT:  f64 = 0.7071;

pub const BANK_LOADING:    f64 = 0.463;
pub const ATM_LOADING:     f64 = 0.167;
pub const AGENT_LOADING:   f64 = 0.074;
pub const NONBANK_LOADING: f64 = 0.296;

pub const D1_WEIGHT: f64 = 0.5017;
pub const D2_WEIGHT: f64 = 0.6274;
pub const D3_WEIGHT: f64 = 0.3576;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeIndex {
    /// Savings/loan access.
    pub d1:  f64,
    /// Access-point density.
    pub d2:  f64,
    /// Usage intensity.
    pub d3:  f64,
    pub afi: f64,
}

/// Unstandardized D2: weighted sum of the per-area densities.
pub fn d2_raw(ratios: &DerivedRatios) -> f64 {
    BANK_LOADING * ratios.bank_per_area
        + ATM_LOADING * ratios.atm_per_area
        + AGENT_LOADING * ratios.agent_per_area
        + NONBANK_LOADING * ratios.nonbank_per_area
}

/// Weighted combination of the three dimensions.
pub fn afi(d1: f64, d2: f64, d3: f64) -> f64 {
    D1_WEIGHT * d1 + D2_WEIGHT * d2 + D3_WEIGHT * d3
}

impl CompositeIndex {
    pub fn compute(ratios: &DerivedRatios, reference: &ReferenceStatistics) -> AfiResult<Self> {
        let m = &reference.moments;

        let z_sav  = z_score(ratios.savings_per_capita, m.savings_per_capita, "savings_per_capita")?;
        let z_loan = z_score(ratios.loans_per_capita, m.loans_per_capita, "loans_per_capita")?;
        let d1 = ACCESS_WEIGHT * z_sav + ACCESS_WEIGHT * z_loan;

        let d2 = z_score(d2_raw(ratios), m.d2_raw, "d2_raw")?;

        let z_dep   = z_score(ratios.deposit_ratio, m.deposit_ratio, "deposit_ratio")?;
        let z_loanr = z_score(ratios.loan_ratio, m.loan_ratio, "loan_ratio")?;
        let d3 = USAGE_WEIGHT * z_dep + USAGE_WEIGHT * z_loanr;

        let afi = afi(d1, d2, d3);

        log::debug!("index: d1={d1:.4} d2={d2:.4} d3={d3:.4} afi={afi:.4}");

        Ok(Self { d1, d2, d3, afi })
    }
}
