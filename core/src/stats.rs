//! Reference statistics — the single normalization source of truth.
//!
//! RULE: Statistics are computed (or loaded) ONCE per training run or
//! simulation session and shared read-only from then on. No component
//! computes its own mean/std inline.
//!
//! A predictor fitted against one ReferenceStatistics is only valid
//! with that same instance. Re-deriving the reference from a different
//! slice of the data (all years vs. one year) is a configuration error,
//! surfaced by `ensure_same_reference`.

use crate::{
    error::{AfiError, AfiResult},
    index::d2_raw,
    ratios::DerivedRatios,
    record::{RegionObservation, RegionRecord},
    standardize::Moments,
    types::Year,
};
use serde::{Deserialize, Serialize};

/// Moments of every standardized quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentsTable {
    pub savings_per_capita: Moments,
    pub loans_per_capita:   Moments,
    pub deposit_ratio:      Moments,
    pub loan_ratio:         Moments,
    pub d2_raw:             Moments,
}

impl MomentsTable {
    /// Constants shipped with the simulation front-end.
    pub const PUBLISHED: MomentsTable = MomentsTable {
        savings_per_capita: Moments::new(1903.8661, 3311.8499),
        loans_per_capita:   Moments::new(248.6242, 310.5978),
        deposit_ratio:      Moments::new(0.1653, 0.1984),
        loan_ratio:         Moments::new(0.3306, 0.1876),
        d2_raw:             Moments::new(3.9019, 4.9254),
    };

    fn entries(&self) -> [(&'static str, Moments); 5] {
        [
            ("savings_per_capita", self.savings_per_capita),
            ("loans_per_capita",   self.loans_per_capita),
            ("deposit_ratio",      self.deposit_ratio),
            ("loan_ratio",         self.loan_ratio),
            ("d2_raw",             self.d2_raw),
        ]
    }
}

/// Where a ReferenceStatistics came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Provenance {
    Live {
        reference_year: Option<Year>,
        population:     usize,
    },
    Fixed {
        label: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStatistics {
    pub moments:    MomentsTable,
    pub provenance: Provenance,
}

impl ReferenceStatistics {
    /// Live mode: moments over a reference population.
    ///
    /// Fails with `InsufficientData` for fewer than two records or when any
    /// standardized quantity has zero spread. A record whose ratios cannot
    /// be derived propagates its `DivisionDomain` error; callers filter
    /// the population first (see `StatisticsSource::provide`).
    pub fn from_population(
        records:        &[RegionRecord],
        reference_year: Option<Year>,
    ) -> AfiResult<Self> {
        if records.len() < 2 {
            return Err(AfiError::InsufficientData {
                reason: format!(
                    "reference population has {} record(s); at least 2 are required",
                    records.len()
                ),
            });
        }

        let ratios = records
            .iter()
            .map(DerivedRatios::derive)
            .collect::<AfiResult<Vec<_>>>()?;

        let column = |f: fn(&DerivedRatios) -> f64| -> Vec<f64> {
            ratios.iter().map(f).collect()
        };

        let moments = MomentsTable {
            savings_per_capita: moments_of(&column(|r| r.savings_per_capita))?,
            loans_per_capita:   moments_of(&column(|r| r.loans_per_capita))?,
            deposit_ratio:      moments_of(&column(|r| r.deposit_ratio))?,
            loan_ratio:         moments_of(&column(|r| r.loan_ratio))?,
            d2_raw:             moments_of(&column(d2_raw))?,
        };

        for (name, m) in moments.entries() {
            if m.std == 0.0 || !m.std.is_finite() {
                return Err(AfiError::InsufficientData {
                    reason: format!("standard deviation of '{name}' is {} over the reference population", m.std),
                });
            }
        }

        log::info!(
            "reference statistics computed over {} records (year slice: {:?})",
            records.len(),
            reference_year
        );

        Ok(Self {
            moments,
            provenance: Provenance::Live { reference_year, population: records.len() },
        })
    }

    /// Fixed mode: literal constants.
    ///
    /// Nothing here can verify that the constants come from the population
    /// the coupled predictor was fitted on.
    pub fn fixed(moments: MomentsTable, label: impl Into<String>) -> Self {
        Self {
            moments,
            provenance: Provenance::Fixed { label: label.into() },
        }
    }

    pub fn published() -> Self {
        Self::fixed(MomentsTable::PUBLISHED, "published")
    }

    /// Same moments, bit for bit. Provenance is descriptive and ignored.
    pub fn same_reference(&self, other: &ReferenceStatistics) -> bool {
        self.moments
            .entries()
            .iter()
            .zip(other.moments.entries().iter())
            .all(|((_, a), (_, b))| {
                a.mean.to_bits() == b.mean.to_bits() && a.std.to_bits() == b.std.to_bits()
            })
    }

    pub fn ensure_same_reference(&self, other: &ReferenceStatistics) -> AfiResult<()> {
        if self.same_reference(other) {
            return Ok(());
        }
        Err(AfiError::StatisticsMismatch {
            reason: format!(
                "session reference {:?} differs from the predictor's fitted reference {:?}",
                self.provenance, other.provenance
            ),
        })
    }
}

fn moments_of(values: &[f64]) -> AfiResult<Moments> {
    Moments::of(values).ok_or_else(|| AfiError::InsufficientData {
        reason: "standard deviation undefined for fewer than 2 values".into(),
    })
}

/// How a training run or a session obtains its reference statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StatisticsSource {
    /// Compute from the dataset, optionally restricted to one year.
    Live {
        #[serde(default)]
        reference_year: Option<Year>,
    },
    /// Use literal constants.
    Fixed {
        #[serde(default = "default_fixed_label")]
        label:   String,
        moments: MomentsTable,
    },
}

fn default_fixed_label() -> String {
    "fixed".into()
}

impl StatisticsSource {
    /// Produce the reference statistics for a dataset.
    ///
    /// In live mode, rows whose ratios cannot be derived are left out of
    /// the reference population with a warning.
    pub fn provide(&self, observations: &[RegionObservation]) -> AfiResult<ReferenceStatistics> {
        match self {
            Self::Fixed { label, moments } => Ok(ReferenceStatistics::fixed(*moments, label.clone())),
            Self::Live { reference_year } => {
                let population: Vec<RegionRecord> = observations
                    .iter()
                    .filter(|o| reference_year.map_or(true, |y| o.year == y))
                    .filter(|o| match DerivedRatios::derive(&o.record) {
                        Ok(_) => true,
                        Err(e) => {
                            log::warn!("excluding {} ({}) from reference population: {e}", o.region, o.year);
                            false
                        }
                    })
                    .map(|o| o.record)
                    .collect();
                ReferenceStatistics::from_population(&population, *reference_year)
            }
        }
    }
}
