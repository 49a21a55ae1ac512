//! Reference statistics tests — live and fixed modes, degenerate populations.

use afi_core::{
    error::AfiError,
    record::{RegionObservation, RegionRecord},
    standardize::Moments,
    stats::{MomentsTable, Provenance, ReferenceStatistics, StatisticsSource},
    synthetic,
};

fn population(seed: u64, n: usize) -> Vec<RegionObservation> {
    synthetic::generate(seed, n, &[2023, 2024])
}

#[test]
fn single_record_population_is_insufficient() {
    let obs = population(1, 1);
    let one = [obs[0].record];
    let err = ReferenceStatistics::from_population(&one, None).unwrap_err();
    assert!(matches!(err, AfiError::InsufficientData { .. }), "unexpected error: {err}");

    let err = ReferenceStatistics::from_population(&[], None).unwrap_err();
    assert!(matches!(err, AfiError::InsufficientData { .. }));
}

#[test]
fn identical_records_have_zero_spread() {
    let record = population(2, 1)[0].record;
    let err = ReferenceStatistics::from_population(&[record, record], None).unwrap_err();
    match err {
        AfiError::InsufficientData { reason } => {
            assert!(reason.contains("savings_per_capita"), "reason: {reason}")
        }
        other => panic!("expected InsufficientData, got {other}"),
    }
}

#[test]
fn live_mode_uses_sample_standard_deviation() {
    let obs = population(3, 2);
    let records: Vec<RegionRecord> = obs.iter().map(|o| o.record).collect();
    let stats = ReferenceStatistics::from_population(&records, None).unwrap();

    let sav: Vec<f64> = records.iter().map(|r| r.savings_accounts / r.population).collect();
    let expected = Moments::of(&sav).unwrap();
    assert_eq!(stats.moments.savings_per_capita, expected);
    assert_eq!(stats.provenance, Provenance::Live { reference_year: None, population: 4 });
}

#[test]
fn year_slice_changes_the_reference() {
    let obs = population(4, 12);
    let all = StatisticsSource::Live { reference_year: None }.provide(&obs).unwrap();
    let slice = StatisticsSource::Live { reference_year: Some(2024) }.provide(&obs).unwrap();

    assert!(!all.same_reference(&slice));
    let err = all.ensure_same_reference(&slice).unwrap_err();
    assert!(matches!(err, AfiError::StatisticsMismatch { .. }));

    match slice.provenance {
        Provenance::Live { reference_year, population } => {
            assert_eq!(reference_year, Some(2024));
            assert_eq!(population, 12);
        }
        other => panic!("expected live provenance, got {other:?}"),
    }
}

#[test]
fn live_provider_skips_underivable_rows() {
    let mut obs = population(5, 6);
    obs[0].record.inhabited_area = 0.0;
    obs[1].record.grdp = -1.0;

    let stats = StatisticsSource::Live { reference_year: None }.provide(&obs).unwrap();
    let clean: Vec<RegionRecord> = obs[2..].iter().map(|o| o.record).collect();
    let expected = ReferenceStatistics::from_population(&clean, None).unwrap();
    assert!(stats.same_reference(&expected));
}

#[test]
fn live_provider_skips_rows_with_non_finite_ratios() {
    let mut obs = population(5, 6);
    obs[0].record.grdp = 1e-300;
    obs[1].record.agents = f64::NAN;

    let stats = StatisticsSource::Live { reference_year: None }.provide(&obs).unwrap();
    let clean: Vec<RegionRecord> = obs[2..].iter().map(|o| o.record).collect();
    let expected = ReferenceStatistics::from_population(&clean, None).unwrap();
    assert!(stats.same_reference(&expected));
    assert!(stats.moments.deposit_ratio.std.is_finite());
    assert!(stats.moments.d2_raw.std.is_finite());
}

#[test]
fn fixed_mode_returns_constants_verbatim() {
    let source = StatisticsSource::Fixed { label: "published".into(), moments: MomentsTable::PUBLISHED };
    let stats = source.provide(&[]).unwrap();
    assert_eq!(stats, ReferenceStatistics::published());
    assert_eq!(stats.moments.d2_raw, Moments::new(3.9019, 4.9254));
    assert_eq!(stats.moments.loan_ratio, Moments::new(0.3306, 0.1876));
}

#[test]
fn statistics_source_deserializes_from_config_json() {
    let live: StatisticsSource =
        serde_json::from_str(r#"{ "mode": "live", "reference_year": 2024 }"#).unwrap();
    assert_eq!(live, StatisticsSource::Live { reference_year: Some(2024) });

    let all_years: StatisticsSource = serde_json::from_str(r#"{ "mode": "live" }"#).unwrap();
    assert_eq!(all_years, StatisticsSource::Live { reference_year: None });
}

#[test]
fn provenance_does_not_affect_reference_identity() {
    let a = ReferenceStatistics::fixed(MomentsTable::PUBLISHED, "a");
    let b = ReferenceStatistics::fixed(MomentsTable::PUBLISHED, "b");
    assert!(a.same_reference(&b));
}
