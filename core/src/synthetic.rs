//! Deterministic synthetic regions for tests and the runner's demo mode.
//!
//! RULE: Nothing here calls a platform RNG. The same seed always
//! produces the same population, so tests can assert exact values.

use crate::{
    record::{RegionObservation, RegionRecord},
    types::Year,
};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct FixtureRng {
    inner: Pcg64Mcg,
}

impl FixtureRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: Pcg64Mcg::seed_from_u64(seed) }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform float in [lo, hi).
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Whole-number count in [lo, hi).
    pub fn count(&mut self, lo: f64, hi: f64) -> f64 {
        self.range(lo, hi).floor()
    }
}

/// One observation per (region, year). Region `i` keeps its own scale
/// across years and drifts upward slightly each year.
pub fn generate(seed: u64, regions: usize, years: &[Year]) -> Vec<RegionObservation> {
    let mut rng = FixtureRng::new(seed);
    let mut out = Vec::with_capacity(regions * years.len());

    for i in 0..regions {
        let population = rng.count(40_000.0, 3_000_000.0);
        let area       = rng.range(20.0, 2_500.0);
        let grdp       = population * rng.range(2.0e7, 1.2e8);
        let urban      = rng.next_f64();

        for (k, year) in years.iter().enumerate() {
            let growth = 1.0 + 0.04 * k as f64;
            let record = RegionRecord {
                savings_accounts:         (population * rng.range(0.3, 2.5) * growth).floor(),
                loan_accounts:            (population * rng.range(0.02, 0.4) * growth).floor(),
                population,
                bank_branches:            rng.count(5.0, 40.0 + 400.0 * urban),
                pawnshop_branches:        rng.count(1.0, 30.0),
                venture_capital_branches: rng.count(0.0, 8.0),
                microfinance_branches:    rng.count(1.0, 25.0),
                atms:                     rng.count(10.0, 60.0 + 1_500.0 * urban),
                agents:                   rng.count(50.0, 3_000.0),
                inhabited_area:           area,
                savings_nominal:          grdp * rng.range(0.05, 0.6) * growth,
                loan_nominal:             grdp * rng.range(0.1, 0.7) * growth,
                grdp,
            };
            let afi_proxy = urban * 6.0 + rng.range(-1.5, 1.5);
            out.push(RegionObservation {
                region: format!("Region {:03}", i + 1),
                year:   *year,
                record,
                ipm:    Some(62.0 + afi_proxy + 1.2 * k as f64),
            });
        }
    }
    out
}
