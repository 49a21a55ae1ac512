//! Store methods for frozen reference-statistics snapshots.

use crate::{
    error::{AfiError, AfiResult},
    stats::ReferenceStatistics,
    types::SnapshotId,
};
use rusqlite::{params, OptionalExtension};

use super::AfiStore;

/// Selector for the most recently frozen snapshot.
pub const LATEST_SNAPSHOT: &str = "latest";

impl AfiStore {
    /// Freeze `stats` and return the new snapshot id.
    pub fn save_reference_snapshot(&self, stats: &ReferenceStatistics) -> AfiResult<SnapshotId> {
        let snapshot_id = uuid::Uuid::new_v4().to_string();
        let json = serde_json::to_string(stats)?;
        self.conn.execute(
            "INSERT INTO reference_snapshot (snapshot_id, created_at, stats_json)
             VALUES (?1, ?2, ?3)",
            params![snapshot_id, chrono::Utc::now().to_rfc3339(), json],
        )?;
        log::debug!("reference snapshot {snapshot_id} saved ({:?})", stats.provenance);
        Ok(snapshot_id)
    }

    pub fn reference_snapshot(&self, snapshot_id: &str) -> AfiResult<Option<ReferenceStatistics>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT stats_json FROM reference_snapshot WHERE snapshot_id = ?1",
                params![snapshot_id],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    /// Most recently frozen snapshot, if any.
    pub fn latest_reference_snapshot(&self) -> AfiResult<Option<(SnapshotId, ReferenceStatistics)>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT snapshot_id, stats_json FROM reference_snapshot
                 ORDER BY created_at DESC, rowid DESC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        match row {
            Some((id, j)) => Ok(Some((id, serde_json::from_str(&j)?))),
            None => Ok(None),
        }
    }

    /// Resolve a frozen reference for a new session.
    ///
    /// `selector` is a snapshot id, or `latest` for the most recent one.
    /// A session built on the result standardizes exactly as the run that
    /// froze it, whatever the observation table holds now.
    pub fn frozen_reference(&self, selector: &str) -> AfiResult<(SnapshotId, ReferenceStatistics)> {
        let found = if selector == LATEST_SNAPSHOT {
            self.latest_reference_snapshot()?
        } else {
            self.reference_snapshot(selector)?
                .map(|stats| (selector.to_string(), stats))
        };
        let (id, stats) = found.ok_or_else(|| AfiError::SnapshotNotFound {
            snapshot_id: selector.to_string(),
        })?;
        log::info!("reusing frozen reference snapshot {id} ({:?})", stats.provenance);
        Ok((id, stats))
    }
}
