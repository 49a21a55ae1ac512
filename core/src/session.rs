//! Simulation session — the context every inference request runs in.
//!
//! A session owns the loaded dataset, ONE shared ReferenceStatistics and
//! the predictor handle. All of it is read-only after construction, so a
//! session can be shared across threads behind an `Arc` without locking.

use crate::{
    comparator::{compare, Comparison},
    error::{AfiError, AfiResult},
    evaluation::Evaluation,
    predictor::Predictor,
    record::{RecordEdits, RegionObservation, RegionRecord},
    stats::ReferenceStatistics,
    types::{RegionName, Year},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Plain scalars handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub region:        RegionName,
    pub year:          Year,
    pub record:        RegionRecord,
    pub d1:            f64,
    pub d2:            f64,
    pub d3:            f64,
    pub afi:           f64,
    pub predicted_ipm: f64,
    pub baseline_ipm:  f64,
    /// predicted_ipm − baseline_ipm
    pub deviation:     f64,
}

impl SimulationOutcome {
    fn from_comparison(region: &str, year: Year, cmp: &Comparison) -> Self {
        let index = cmp.edited.index();
        Self {
            region:        region.to_string(),
            year,
            record:        cmp.edited.record,
            d1:            index.d1,
            d2:            index.d2,
            d3:            index.d3,
            afi:           index.afi,
            predicted_ipm: cmp.edited.predicted_ipm,
            baseline_ipm:  cmp.baseline.predicted_ipm,
            deviation:     cmp.deviation,
        }
    }
}

pub struct SimulationSession {
    observations: Vec<RegionObservation>,
    reference:    Arc<ReferenceStatistics>,
    predictor:    Arc<dyn Predictor>,
}

impl SimulationSession {
    /// Fails with `StatisticsMismatch` when the predictor records the
    /// reference it was fitted against and that reference differs.
    pub fn new(
        observations: Vec<RegionObservation>,
        reference:    Arc<ReferenceStatistics>,
        predictor:    Arc<dyn Predictor>,
    ) -> AfiResult<Self> {
        if let Some(fitted) = predictor.fitted_reference() {
            reference.ensure_same_reference(fitted)?;
        }
        log::info!(
            "simulation session: {} observations, reference {:?}",
            observations.len(),
            reference.provenance
        );
        Ok(Self { observations, reference, predictor })
    }

    pub fn reference(&self) -> &Arc<ReferenceStatistics> {
        &self.reference
    }

    pub fn observations(&self) -> &[RegionObservation] {
        &self.observations
    }

    /// Distinct region names for `year`, in dataset order.
    pub fn regions(&self, year: Year) -> Vec<RegionName> {
        let mut names: Vec<RegionName> = Vec::new();
        for obs in self.observations.iter().filter(|o| o.year == year) {
            if !names.contains(&obs.region) {
                names.push(obs.region.clone());
            }
        }
        names
    }

    /// Stored values for a region, used to pre-fill the editor.
    /// The first matching row wins.
    pub fn defaults(&self, region: &str, year: Year) -> AfiResult<RegionRecord> {
        self.observations
            .iter()
            .find(|o| o.year == year && o.region == region)
            .map(|o| o.record)
            .ok_or_else(|| AfiError::RegionNotFound { region: region.to_string(), year })
    }

    /// Evaluate an ad-hoc record that is not tied to a stored region.
    pub fn evaluate(&self, record: &RegionRecord) -> AfiResult<Evaluation> {
        Evaluation::run(record, &self.reference, self.predictor.as_ref())
    }

    /// Compare two arbitrary records under this session's reference.
    pub fn compare(&self, original: &RegionRecord, edited: &RegionRecord) -> AfiResult<Comparison> {
        compare(original, edited, &self.reference, self.predictor.as_ref())
    }

    /// Apply `edits` over a region's stored values and report the result
    /// against the unedited baseline.
    pub fn simulate(&self, region: &str, year: Year, edits: &RecordEdits) -> AfiResult<SimulationOutcome> {
        let original = self.defaults(region, year)?;
        let edited = original.with_edits(edits);
        let cmp = self.compare(&original, &edited)?;
        let outcome = SimulationOutcome::from_comparison(region, year, &cmp);

        log::debug!(
            "simulate {region} ({year}): {} edit(s), afi={:.4} ipm={:.2} deviation={:+.2}",
            edits.values.len(),
            outcome.afi,
            outcome.predicted_ipm,
            outcome.deviation
        );

        Ok(outcome)
    }
}
