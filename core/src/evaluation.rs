//! Record evaluation — ratios, index and feature vector for one record.
//!
//! Training and simulation both go through `IndexedRecord::compute`,
//! so a record run through either path yields the same AFI, bit for bit.

use crate::{
    error::AfiResult,
    features::FeatureVector,
    index::CompositeIndex,
    predictor::Predictor,
    ratios::DerivedRatios,
    record::RegionRecord,
    stats::ReferenceStatistics,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexedRecord {
    pub ratios:   DerivedRatios,
    pub index:    CompositeIndex,
    pub features: FeatureVector,
}

impl IndexedRecord {
    pub fn compute(record: &RegionRecord, reference: &ReferenceStatistics) -> AfiResult<Self> {
        let ratios   = DerivedRatios::derive(record)?;
        let index    = CompositeIndex::compute(&ratios, reference)?;
        let features = FeatureVector::assemble(record, index.afi)?;
        Ok(Self { ratios, index, features })
    }
}

/// An indexed record plus the predictor's output for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub record:        RegionRecord,
    pub indexed:       IndexedRecord,
    pub predicted_ipm: f64,
}

impl Evaluation {
    pub fn run(
        record:    &RegionRecord,
        reference: &ReferenceStatistics,
        predictor: &dyn Predictor,
    ) -> AfiResult<Self> {
        let indexed = IndexedRecord::compute(record, reference)?;
        let predicted_ipm = predictor.predict(&indexed.features)?;
        Ok(Self { record: *record, indexed, predicted_ipm })
    }

    pub fn index(&self) -> &CompositeIndex {
        &self.indexed.index
    }
}
