//! Predictor contract.
//!
//! The regression model is an external collaborator. The core only
//! knows two operations: `Regressor::fit` on a feature matrix and
//! `Predictor::predict` on one vector. Failures from either are passed
//! back to the caller untouched, with no retries.

use crate::{
    error::PredictorError,
    features::{FeatureMatrix, FeatureVector, FEATURE_COUNT},
    stats::ReferenceStatistics,
};
use serde::{Deserialize, Serialize};

/// Inference: one vector in, one predicted IPM out.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictorError>;

    /// Reference statistics the model was fitted against, if it records them.
    /// Sessions refuse a predictor whose reference differs from their own.
    fn fitted_reference(&self) -> Option<&ReferenceStatistics> {
        None
    }
}

impl<F> Predictor for F
where
    F: Fn(&FeatureVector) -> Result<f64, PredictorError> + Send + Sync,
{
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictorError> {
        self(features)
    }
}

/// Training: fit a model on a feature matrix and target vector.
pub trait Regressor {
    type Model: Predictor;

    fn fit(&self, matrix: &FeatureMatrix, targets: &[f64]) -> Result<Self::Model, PredictorError>;
}

/// Linear stand-in model loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPredictor {
    pub intercept:    f64,
    pub coefficients: [f64; FEATURE_COUNT],
    #[serde(default)]
    pub reference:    Option<ReferenceStatistics>,
}

impl LinearPredictor {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Predictor for LinearPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictorError> {
        let y = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.as_slice())
                .map(|(c, x)| c * x)
                .sum::<f64>();
        if y.is_finite() {
            Ok(y)
        } else {
            Err(PredictorError::new(format!("linear model produced non-finite output {y}")))
        }
    }

    fn fitted_reference(&self) -> Option<&ReferenceStatistics> {
        self.reference.as_ref()
    }
}
