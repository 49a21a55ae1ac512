//! Shared primitive types used across the crate.

/// Calendar year of an observation (`Tahun` column).
pub type Year = i32;

/// Region display name (`Kabupaten / Kota` column).
pub type RegionName = String;

/// Identifier of a frozen reference-statistics snapshot.
pub type SnapshotId = String;
