//! Baseline/deviation comparison between an original and an edited record.
//!
//! Both sides are evaluated against the SAME reference statistics and
//! the SAME predictor. Only the raw fields (and therefore AFI) differ.

use crate::{
    error::AfiResult,
    evaluation::Evaluation,
    predictor::Predictor,
    record::RegionRecord,
    stats::ReferenceStatistics,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub baseline:  Evaluation,
    pub edited:    Evaluation,
    /// predicted(edited) − predicted(baseline)
    pub deviation: f64,
}

pub fn compare(
    original:  &RegionRecord,
    edited:    &RegionRecord,
    reference: &ReferenceStatistics,
    predictor: &dyn Predictor,
) -> AfiResult<Comparison> {
    let baseline = Evaluation::run(original, reference, predictor)?;
    let edited   = Evaluation::run(edited, reference, predictor)?;
    let deviation = edited.predicted_ipm - baseline.predicted_ipm;

    log::debug!(
        "comparison: baseline={:.4} edited={:.4} deviation={deviation:+.4}",
        baseline.predicted_ipm,
        edited.predicted_ipm
    );

    Ok(Comparison { baseline, edited, deviation })
}
