//! Region records — the typed boundary between the data source and the core.
//!
//! RULE: Nothing past this module looks a field up by string.
//! Column names are resolved exactly once, in `RegionRecord::from_columns`.
//!
//! RawField::ALL is the contractual feature order. NEVER reorder it:
//! the external predictor is positional and would silently misread inputs.

use crate::{
    error::{AfiError, AfiResult},
    types::{RegionName, Year},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The 13 raw indicators of a (region, year) observation.
/// Declaration order is `ALL` order; the discriminant is the feature position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawField {
    SavingsAccounts,
    LoanAccounts,
    Population,
    BankBranches,
    PawnshopBranches,
    VentureCapitalBranches,
    MicrofinanceBranches,
    Atms,
    Agents,
    InhabitedArea,
    SavingsNominal,
    LoanNominal,
    Grdp,
}

impl RawField {
    pub const ALL: [RawField; 13] = [
        Self::SavingsAccounts,
        Self::LoanAccounts,
        Self::Population,
        Self::BankBranches,
        Self::PawnshopBranches,
        Self::VentureCapitalBranches,
        Self::MicrofinanceBranches,
        Self::Atms,
        Self::Agents,
        Self::InhabitedArea,
        Self::SavingsNominal,
        Self::LoanNominal,
        Self::Grdp,
    ];

    /// Stable snake_case key (JSON rows, IPC payloads, `--set` flags).
    pub fn key(&self) -> &'static str {
        match self {
            Self::SavingsAccounts        => "savings_accounts",
            Self::LoanAccounts           => "loan_accounts",
            Self::Population             => "population",
            Self::BankBranches           => "bank_branches",
            Self::PawnshopBranches       => "pawnshop_branches",
            Self::VentureCapitalBranches => "venture_capital_branches",
            Self::MicrofinanceBranches   => "microfinance_branches",
            Self::Atms                   => "atms",
            Self::Agents                 => "agents",
            Self::InhabitedArea          => "inhabited_area",
            Self::SavingsNominal         => "savings_nominal",
            Self::LoanNominal            => "loan_nominal",
            Self::Grdp                   => "grdp",
        }
    }

    /// Spreadsheet header as published by the data source.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::SavingsAccounts        => "Rekening Tabungan Perorangan Bank",
            Self::LoanAccounts           => "Rekening Kredit Perorangan Bank",
            Self::Population             => "Jumlah penduduk",
            Self::BankBranches           => "Jumlah Kantor Bank",
            Self::PawnshopBranches       => "Jumlah Kantor Pegadaian",
            Self::VentureCapitalBranches => "Jumlah Kantor PMV",
            Self::MicrofinanceBranches   => "Jumlah Kantor PNM",
            Self::Atms                   => "Jumlah ATM",
            Self::Agents                 => "Jumlah Agen Laku Pandai",
            Self::InhabitedArea          => "Luas Terhuni",
            Self::SavingsNominal         => "Nominal Tabungan Perorangan Bank",
            Self::LoanNominal            => "Nominal Kredit Perorangan Bank",
            Self::Grdp                   => "PDRB",
        }
    }

    /// Resolve either a snake_case key or a spreadsheet header.
    /// Headers are matched after trimming surrounding whitespace.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key() == name || f.column_name().eq_ignore_ascii_case(name))
    }
}

/// One (region, year) observation of the 13 raw indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub savings_accounts:         f64,
    pub loan_accounts:            f64,
    pub population:               f64,
    pub bank_branches:            f64,
    pub pawnshop_branches:        f64,
    pub venture_capital_branches: f64,
    pub microfinance_branches:    f64,
    pub atms:                     f64,
    pub agents:                   f64,
    pub inhabited_area:           f64,
    pub savings_nominal:          f64,
    pub loan_nominal:             f64,
    pub grdp:                     f64,
}

impl RegionRecord {
    pub fn get(&self, field: RawField) -> f64 {
        match field {
            RawField::SavingsAccounts        => self.savings_accounts,
            RawField::LoanAccounts           => self.loan_accounts,
            RawField::Population             => self.population,
            RawField::BankBranches           => self.bank_branches,
            RawField::PawnshopBranches       => self.pawnshop_branches,
            RawField::VentureCapitalBranches => self.venture_capital_branches,
            RawField::MicrofinanceBranches   => self.microfinance_branches,
            RawField::Atms                   => self.atms,
            RawField::Agents                 => self.agents,
            RawField::InhabitedArea          => self.inhabited_area,
            RawField::SavingsNominal         => self.savings_nominal,
            RawField::LoanNominal            => self.loan_nominal,
            RawField::Grdp                   => self.grdp,
        }
    }

    pub fn set(&mut self, field: RawField, value: f64) {
        let slot = match field {
            RawField::SavingsAccounts        => &mut self.savings_accounts,
            RawField::LoanAccounts           => &mut self.loan_accounts,
            RawField::Population             => &mut self.population,
            RawField::BankBranches           => &mut self.bank_branches,
            RawField::PawnshopBranches       => &mut self.pawnshop_branches,
            RawField::VentureCapitalBranches => &mut self.venture_capital_branches,
            RawField::MicrofinanceBranches   => &mut self.microfinance_branches,
            RawField::Atms                   => &mut self.atms,
            RawField::Agents                 => &mut self.agents,
            RawField::InhabitedArea          => &mut self.inhabited_area,
            RawField::SavingsNominal         => &mut self.savings_nominal,
            RawField::LoanNominal            => &mut self.loan_nominal,
            RawField::Grdp                   => &mut self.grdp,
        };
        *slot = value;
    }

    /// Build a record from a decoded row of named columns.
    ///
    /// Column order is irrelevant. Unknown columns are ignored.
    /// A missing column, or a cell that is not a finite number,
    /// is a `SchemaMismatch`. No default is ever substituted.
    pub fn from_columns<'a, I>(columns: I) -> AfiResult<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut resolved: HashMap<RawField, f64> = HashMap::new();
        for (name, value) in columns {
            if let Some(field) = RawField::parse(name) {
                resolved.insert(field, value);
            }
        }

        let mut values = [0.0f64; 13];
        for (slot, field) in values.iter_mut().zip(RawField::ALL) {
            match resolved.get(&field) {
                Some(v) if v.is_finite() => *slot = *v,
                _ => {
                    return Err(AfiError::SchemaMismatch {
                        field: field.column_name().to_string(),
                    })
                }
            }
        }
        Ok(Self::from_array(values))
    }

    /// Raw values in contractual feature order.
    pub fn to_array(&self) -> [f64; 13] {
        RawField::ALL.map(|f| self.get(f))
    }

    fn from_array(values: [f64; 13]) -> Self {
        let [savings_accounts, loan_accounts, population, bank_branches, pawnshop_branches,
             venture_capital_branches, microfinance_branches, atms, agents, inhabited_area,
             savings_nominal, loan_nominal, grdp] = values;
        Self {
            savings_accounts,
            loan_accounts,
            population,
            bank_branches,
            pawnshop_branches,
            venture_capital_branches,
            microfinance_branches,
            atms,
            agents,
            inhabited_area,
            savings_nominal,
            loan_nominal,
            grdp,
        }
    }

    /// Copy of this record with `edits` applied on top.
    pub fn with_edits(&self, edits: &RecordEdits) -> Self {
        let mut edited = *self;
        for (field, value) in &edits.values {
            edited.set(*field, *value);
        }
        edited
    }
}

/// A decoded data-source row: one region in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionObservation {
    pub region: RegionName,
    pub year:   Year,
    pub record: RegionRecord,
    /// Target IPM. Absent for inference-only rows.
    #[serde(default)]
    pub ipm:    Option<f64>,
}

/// User overrides applied over a region's stored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordEdits {
    pub values: HashMap<RawField, f64>,
}

impl RecordEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: RawField, value: f64) -> Self {
        self.values.insert(field, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
