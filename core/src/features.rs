//! Feature vector assembly — the only seam between the core and the predictor.
//!
//! LAYOUT (positional, never reordered):
//!   0..=12  raw fields in RawField::ALL order
//!   13      AFI

use crate::{
    error::{AfiError, AfiResult},
    record::{RawField, RegionRecord},
    types::{RegionName, Year},
};
use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 14;
pub const AFI_POSITION:  usize = 13;

/// Column names in feature order, as the predictor was trained with them.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Rekening Tabungan Perorangan Bank",
    "Rekening Kredit Perorangan Bank",
    "Jumlah penduduk",
    "Jumlah Kantor Bank",
    "Jumlah Kantor Pegadaian",
    "Jumlah Kantor PMV",
    "Jumlah Kantor PNM",
    "Jumlah ATM",
    "Jumlah Agen Laku Pandai",
    "Luas Terhuni",
    "Nominal Tabungan Perorangan Bank",
    "Nominal Kredit Perorangan Bank",
    "PDRB",
    "AFI",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Assemble the 14-element vector for `record` and its AFI.
    ///
    /// Every element must be finite; a NaN cell is a missing value and
    /// fails with `SchemaMismatch` instead of reaching the predictor.
    pub fn assemble(record: &RegionRecord, afi: f64) -> AfiResult<Self> {
        let mut values = [0.0f64; FEATURE_COUNT];
        for (i, field) in RawField::ALL.iter().enumerate() {
            let v = record.get(*field);
            if !v.is_finite() {
                return Err(AfiError::SchemaMismatch { field: field.column_name().to_string() });
            }
            values[i] = v;
        }
        if !afi.is_finite() {
            return Err(AfiError::SchemaMismatch { field: FEATURE_NAMES[AFI_POSITION].to_string() });
        }
        values[AFI_POSITION] = afi;
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Raw fields sit at their declaration index (`RawField::ALL` order).
    pub fn raw(&self, field: RawField) -> f64 {
        self.0[field as usize]
    }

    pub fn afi(&self) -> f64 {
        self.0[AFI_POSITION]
    }
}

/// Identifies which observation a matrix row came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowLabel {
    pub region: RegionName,
    pub year:   Year,
}

/// Training matrix: one FeatureVector per row, with provenance labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub labels:  Vec<RowLabel>,
    pub rows:    Vec<FeatureVector>,
}

impl FeatureMatrix {
    pub fn new() -> Self {
        Self {
            columns: FEATURE_NAMES.iter().map(|c| c.to_string()).collect(),
            labels:  Vec::new(),
            rows:    Vec::new(),
        }
    }

    pub fn push(&mut self, label: RowLabel, row: FeatureVector) {
        self.labels.push(label);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
