//! Z-score standardization against a reference distribution.

use crate::error::{AfiError, AfiResult};
use serde::{Deserialize, Serialize};

/// Mean and sample standard deviation of one quantity over a
/// reference population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub mean: f64,
    pub std:  f64,
}

impl Moments {
    pub const fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    /// Mean and sample (n − 1) standard deviation of `values`.
    /// Returns None for fewer than two values.
    pub fn of(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n < 2 {
            return None;
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        let std = (sum_sq / (n - 1) as f64).sqrt();
        Some(Self { mean, std })
    }
}

/// `(value - mean) / std`.
///
/// `statistic` names the quantity for the error message only.
pub fn z_score(value: f64, moments: Moments, statistic: &'static str) -> AfiResult<f64> {
    if moments.std == 0.0 || !moments.std.is_finite() {
        return Err(AfiError::DivisionByZero { statistic, std: moments.std });
    }
    Ok((value - moments.mean) / moments.std)
}
