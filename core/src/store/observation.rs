//! Store methods for region observations.

use crate::{
    error::AfiResult,
    record::{RegionObservation, RegionRecord},
    types::Year,
};
use rusqlite::{params, Row};
use std::collections::HashSet;

use super::AfiStore;

const OBSERVATION_COLUMNS: &str =
    "region, year, savings_accounts, loan_accounts, population, bank_branches,
     pawnshop_branches, venture_capital_branches, microfinance_branches, atms,
     agents, inhabited_area, savings_nominal, loan_nominal, grdp, ipm";

impl AfiStore {
    /// Insert the row for (region, year), or update it in place.
    /// An updated row keeps its id, so dataset order is preserved.
    pub fn upsert_observation(&self, obs: &RegionObservation) -> AfiResult<()> {
        let r = &obs.record;
        self.conn.execute(
            &format!(
                "INSERT INTO region_observation ({OBSERVATION_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                 ON CONFLICT (region, year) DO UPDATE SET
                    savings_accounts         = excluded.savings_accounts,
                    loan_accounts            = excluded.loan_accounts,
                    population               = excluded.population,
                    bank_branches            = excluded.bank_branches,
                    pawnshop_branches        = excluded.pawnshop_branches,
                    venture_capital_branches = excluded.venture_capital_branches,
                    microfinance_branches    = excluded.microfinance_branches,
                    atms                     = excluded.atms,
                    agents                   = excluded.agents,
                    inhabited_area           = excluded.inhabited_area,
                    savings_nominal          = excluded.savings_nominal,
                    loan_nominal             = excluded.loan_nominal,
                    grdp                     = excluded.grdp,
                    ipm                      = excluded.ipm"
            ),
            params![
                obs.region,
                obs.year,
                r.savings_accounts,
                r.loan_accounts,
                r.population,
                r.bank_branches,
                r.pawnshop_branches,
                r.venture_capital_branches,
                r.microfinance_branches,
                r.atms,
                r.agents,
                r.inhabited_area,
                r.savings_nominal,
                r.loan_nominal,
                r.grdp,
                obs.ipm,
            ],
        )?;
        Ok(())
    }

    /// Import a dataset in one transaction and return the rows written.
    ///
    /// Within one batch the FIRST row for a (region, year) wins; later
    /// duplicates are skipped with a warning. Rows from an earlier import
    /// are updated in place. Any failure rolls the whole batch back.
    pub fn import_observations(&self, observations: &[RegionObservation]) -> AfiResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut seen: HashSet<(&str, Year)> = HashSet::new();
        let mut written = 0;
        for obs in observations {
            if !seen.insert((obs.region.as_str(), obs.year)) {
                log::warn!(
                    "duplicate observation for {} ({}) skipped; the first row is kept",
                    obs.region,
                    obs.year
                );
                continue;
            }
            self.upsert_observation(obs)?;
            written += 1;
        }
        tx.commit()?;
        log::info!("imported {written} observations ({} duplicates skipped)", observations.len() - written);
        Ok(written)
    }

    /// All observations, optionally restricted to one year, in insertion order.
    pub fn observations(&self, year: Option<Year>) -> AfiResult<Vec<RegionObservation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM region_observation
             WHERE ?1 IS NULL OR year = ?1
             ORDER BY id ASC"
        ))?;
        let rows = stmt
            .query_map(params![year], observation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn observation_count(&self) -> AfiResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM region_observation",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn observation_from_row(row: &Row<'_>) -> rusqlite::Result<RegionObservation> {
    Ok(RegionObservation {
        region: row.get(0)?,
        year:   row.get(1)?,
        record: RegionRecord {
            savings_accounts:         row.get(2)?,
            loan_accounts:            row.get(3)?,
            population:               row.get(4)?,
            bank_branches:            row.get(5)?,
            pawnshop_branches:        row.get(6)?,
            venture_capital_branches: row.get(7)?,
            microfinance_branches:    row.get(8)?,
            atms:                     row.get(9)?,
            agents:                   row.get(10)?,
            inhabited_area:           row.get(11)?,
            savings_nominal:          row.get(12)?,
            loan_nominal:             row.get(13)?,
            grdp:                     row.get(14)?,
        },
        ipm: row.get(15)?,
    })
}
