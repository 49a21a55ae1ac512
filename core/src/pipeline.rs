//! Training pipeline — dataset to feature matrix to fitted model.
//!
//! STAGES (fixed order):
//!   1. Resolve reference statistics ONCE from the configured source.
//!   2. Index every derivable row against that single reference.
//!   3. Keep rows with a finite IPM target (the rest only informed step 1).
//!   4. Hand the matrix to the external regressor.
//!
//! Rows with an invalid denominator are excluded and counted, never
//! patched with a default.

use crate::{
    error::AfiResult,
    evaluation::IndexedRecord,
    features::{FeatureMatrix, RowLabel},
    predictor::Regressor,
    record::RegionObservation,
    stats::{ReferenceStatistics, StatisticsSource},
};
use serde::Serialize;
use std::sync::Arc;

/// Why a row did not make it into the training matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedRow {
    pub label:  RowLabel,
    pub reason: String,
}

/// Everything the external regressor needs, plus the reference it implies.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub reference: Arc<ReferenceStatistics>,
    pub matrix:    FeatureMatrix,
    pub targets:   Vec<f64>,
    pub excluded:  Vec<ExcludedRow>,
}

/// A fitted model paired with the reference statistics it was fitted against.
pub struct TrainedModel<M> {
    pub reference: Arc<ReferenceStatistics>,
    pub model:     M,
    pub rows_used: usize,
}

pub struct TrainingPipeline {
    observations: Vec<RegionObservation>,
    source:       StatisticsSource,
}

impl TrainingPipeline {
    pub fn new(observations: Vec<RegionObservation>, source: StatisticsSource) -> Self {
        Self { observations, source }
    }

    pub fn build(&self) -> AfiResult<TrainingSet> {
        let reference = Arc::new(self.source.provide(&self.observations)?);
        self.build_with(reference)
    }

    /// Build the matrix against an already-resolved reference.
    pub fn build_with(&self, reference: Arc<ReferenceStatistics>) -> AfiResult<TrainingSet> {
        let mut matrix   = FeatureMatrix::new();
        let mut targets  = Vec::new();
        let mut excluded = Vec::new();

        for obs in &self.observations {
            let label = RowLabel { region: obs.region.clone(), year: obs.year };

            let target = match obs.ipm {
                Some(ipm) if ipm.is_finite() => ipm,
                _ => {
                    excluded.push(ExcludedRow { label, reason: "missing IPM target".into() });
                    continue;
                }
            };

            match IndexedRecord::compute(&obs.record, &reference) {
                Ok(indexed) => {
                    matrix.push(label, indexed.features);
                    targets.push(target);
                }
                Err(e) => {
                    log::warn!("excluding {} ({}) from training: {e}", obs.region, obs.year);
                    excluded.push(ExcludedRow { label, reason: e.to_string() });
                }
            }
        }

        log::info!(
            "training set: {} rows, {} excluded, reference {:?}",
            matrix.len(),
            excluded.len(),
            reference.provenance
        );

        Ok(TrainingSet { reference, matrix, targets, excluded })
    }

    pub fn fit<R: Regressor>(&self, regressor: &R) -> AfiResult<TrainedModel<R::Model>> {
        let set = self.build()?;
        let model = regressor.fit(&set.matrix, &set.targets)?;
        Ok(TrainedModel {
            reference: set.reference,
            model,
            rows_used: set.targets.len(),
        })
    }
}
