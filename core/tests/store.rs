//! Store tests — observation import, frozen reference snapshots, simulation log.

use afi_core::{
    error::AfiError,
    predictor::LinearPredictor,
    record::RecordEdits,
    record::RawField,
    session::SimulationSession,
    stats::{ReferenceStatistics, StatisticsSource},
    store::{AfiStore, LATEST_SNAPSHOT},
    synthetic,
};
use std::sync::Arc;

fn store() -> AfiStore {
    let store = AfiStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

#[test]
fn observations_round_trip_in_insertion_order() {
    let store = store();
    let obs = synthetic::generate(21, 4, &[2023, 2024]);
    assert_eq!(store.import_observations(&obs).unwrap(), 8);
    assert_eq!(store.observation_count().unwrap(), 8);

    assert_eq!(store.observations(None).unwrap(), obs);

    let only_2024: Vec<_> = obs.iter().filter(|o| o.year == 2024).cloned().collect();
    assert_eq!(store.observations(Some(2024)).unwrap(), only_2024);
}

#[test]
fn reimport_replaces_region_year() {
    let store = store();
    let mut obs = synthetic::generate(22, 2, &[2024]);
    store.import_observations(&obs).unwrap();

    obs[0].ipm = None;
    obs[0].record.atms += 10.0;
    store.upsert_observation(&obs[0]).unwrap();

    assert_eq!(store.observation_count().unwrap(), 2);
    let stored = store.observations(Some(2024)).unwrap();
    let updated = stored.iter().find(|o| o.region == obs[0].region).unwrap();
    assert_eq!(updated.ipm, None);
    assert_eq!(updated.record.atms, obs[0].record.atms);
}

#[test]
fn duplicate_region_year_in_one_batch_keeps_the_first_row() {
    let store = store();
    let obs = synthetic::generate(25, 2, &[2024]);
    let mut duplicate = obs[0].clone();
    duplicate.record.atms += 999.0;
    duplicate.ipm = None;

    let batch = vec![obs[0].clone(), obs[1].clone(), duplicate];
    assert_eq!(store.import_observations(&batch).unwrap(), 2);
    assert_eq!(store.observation_count().unwrap(), 2);

    // Dataset order and first-row values both survive.
    assert_eq!(store.observations(None).unwrap(), obs);
}

#[test]
fn updating_a_row_keeps_its_position() {
    let store = store();
    let mut obs = synthetic::generate(26, 3, &[2024]);
    store.import_observations(&obs).unwrap();

    obs[0].record.agents += 5.0;
    store.import_observations(&obs[..1]).unwrap();

    let regions: Vec<String> = store.observations(None).unwrap().into_iter().map(|o| o.region).collect();
    assert_eq!(regions, vec!["Region 001", "Region 002", "Region 003"]);
    assert_eq!(store.observations(None).unwrap()[0].record.agents, obs[0].record.agents);
}

#[test]
fn failed_import_rolls_back_the_whole_batch() {
    let store = store();
    let mut obs = synthetic::generate(27, 3, &[2024]);
    // SQLite stores NaN as NULL, which the NOT NULL column rejects.
    obs[2].record.atms = f64::NAN;

    assert!(store.import_observations(&obs).is_err());
    assert_eq!(store.observation_count().unwrap(), 0);

    // No transaction is left open: the next import commits normally.
    assert_eq!(store.import_observations(&obs[..2]).unwrap(), 2);
    assert_eq!(store.observation_count().unwrap(), 2);
}

/// A frozen reference reloads bit for bit, so a later session
/// standardizes exactly as the training run did.
#[test]
fn reference_snapshot_reloads_identically() {
    let store = store();
    let obs = synthetic::generate(23, 10, &[2024]);
    let stats = StatisticsSource::Live { reference_year: Some(2024) }.provide(&obs).unwrap();

    let id = store.save_reference_snapshot(&stats).unwrap();
    let loaded = store.reference_snapshot(&id).unwrap().expect("snapshot");
    assert!(loaded.same_reference(&stats));
    assert_eq!(loaded, stats);

    let (latest_id, latest) = store.latest_reference_snapshot().unwrap().expect("latest");
    assert_eq!(latest_id, id);
    assert_eq!(latest, stats);

    assert!(store.reference_snapshot("no-such-snapshot").unwrap().is_none());
}

#[test]
fn later_session_reuses_the_frozen_reference() {
    let store = store();
    let source = StatisticsSource::Live { reference_year: None };
    store.import_observations(&synthetic::generate(28, 6, &[2024])).unwrap();
    let trained = source.provide(&store.observations(None).unwrap()).unwrap();
    let id = store.save_reference_snapshot(&trained).unwrap();

    // The table moves on after training.
    store.import_observations(&synthetic::generate(29, 6, &[2025])).unwrap();
    let observations = store.observations(None).unwrap();
    let recomputed = source.provide(&observations).unwrap();
    assert!(!recomputed.same_reference(&trained));

    let (by_id, frozen) = store.frozen_reference(&id).unwrap();
    assert_eq!(by_id, id);
    assert!(frozen.same_reference(&trained));
    let (latest_id, latest) = store.frozen_reference(LATEST_SNAPSHOT).unwrap();
    assert_eq!(latest_id, id);
    assert_eq!(latest, frozen);

    let model = LinearPredictor { intercept: 70.0, coefficients: [0.0; 14], reference: Some(trained) };
    let session = SimulationSession::new(observations, Arc::new(frozen), Arc::new(model)).unwrap();
    assert_eq!(session.simulate("Region 001", 2025, &RecordEdits::new()).unwrap().deviation, 0.0);
}

#[test]
fn unknown_snapshot_is_reported() {
    let store = store();
    let err = store.frozen_reference("no-such-snapshot").unwrap_err();
    assert!(matches!(err, AfiError::SnapshotNotFound { ref snapshot_id } if snapshot_id == "no-such-snapshot"));

    let err = store.frozen_reference(LATEST_SNAPSHOT).unwrap_err();
    assert!(matches!(err, AfiError::SnapshotNotFound { .. }));
}

#[test]
fn simulations_are_logged_against_their_snapshot() {
    let store = store();
    let obs = synthetic::generate(24, 3, &[2024]);
    store.import_observations(&obs).unwrap();

    let reference = Arc::new(ReferenceStatistics::published());
    let snapshot_id = store.save_reference_snapshot(&reference).unwrap();
    let model = LinearPredictor { intercept: 70.0, coefficients: [0.0; 14], reference: None };
    let session = SimulationSession::new(store.observations(None).unwrap(), reference, Arc::new(model)).unwrap();

    let edits = RecordEdits::new().set(RawField::Agents, 1_234.0);
    let outcome = session.simulate("Region 002", 2024, &edits).unwrap();
    store.log_simulation(Some(&snapshot_id), &edits, &outcome).unwrap();
    store.log_simulation(None, &RecordEdits::new(), &outcome).unwrap();

    assert_eq!(store.simulation_count("Region 002").unwrap(), 2);
    assert_eq!(store.simulation_count("Region 001").unwrap(), 0);
}
