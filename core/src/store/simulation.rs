//! Store methods for the simulation request log.

use crate::{error::AfiResult, record::RecordEdits, session::SimulationOutcome};
use rusqlite::params;

use super::AfiStore;

impl AfiStore {
    pub fn log_simulation(
        &self,
        snapshot_id: Option<&str>,
        edits:       &RecordEdits,
        outcome:     &SimulationOutcome,
    ) -> AfiResult<()> {
        self.conn.execute(
            "INSERT INTO simulation_log
                 (snapshot_id, region, year, edits_json, afi, predicted_ipm,
                  baseline_ipm, deviation, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                snapshot_id,
                outcome.region,
                outcome.year,
                serde_json::to_string(edits)?,
                outcome.afi,
                outcome.predicted_ipm,
                outcome.baseline_ipm,
                outcome.deviation,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // ── Test / summary helpers ────────────────────────────────────────

    pub fn simulation_count(&self, region: &str) -> AfiResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM simulation_log WHERE region = ?1",
            params![region],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
