//! Feature vector tests — the positional contract with the predictor.

use afi_core::{
    error::AfiError,
    features::{FeatureVector, AFI_POSITION, FEATURE_COUNT, FEATURE_NAMES},
    record::{RawField, RegionRecord},
};

/// Columns in spreadsheet order with distinct values 1..=13.
fn spreadsheet_row() -> Vec<(&'static str, f64)> {
    vec![
        ("Rekening Tabungan Perorangan Bank", 1.0),
        ("Rekening Kredit Perorangan Bank", 2.0),
        ("Jumlah penduduk", 3.0),
        ("Jumlah Kantor Bank", 4.0),
        ("Jumlah Kantor Pegadaian", 5.0),
        ("Jumlah Kantor PMV", 6.0),
        ("Jumlah Kantor PNM", 7.0),
        ("Jumlah ATM", 8.0),
        ("Jumlah Agen Laku Pandai", 9.0),
        ("Luas Terhuni", 10.0),
        ("Nominal Tabungan Perorangan Bank ", 11.0),
        ("Nominal Kredit Perorangan Bank", 12.0),
        ("PDRB", 13.0),
    ]
}

#[test]
fn vector_has_fourteen_elements_in_documented_order() {
    let record = RegionRecord::from_columns(spreadsheet_row()).unwrap();
    let v = FeatureVector::assemble(&record, 99.5).unwrap();

    assert_eq!(v.as_slice().len(), FEATURE_COUNT);
    let expected: Vec<f64> = (1..=13).map(f64::from).chain(std::iter::once(99.5)).collect();
    assert_eq!(v.as_slice(), expected.as_slice());
    assert_eq!(v.afi(), 99.5);
    assert_eq!(AFI_POSITION, 13);
}

#[test]
fn every_raw_field_lands_at_its_position() {
    let record = RegionRecord::from_columns(spreadsheet_row()).unwrap();
    let v = FeatureVector::assemble(&record, 0.0).unwrap();
    for (i, field) in RawField::ALL.iter().enumerate() {
        assert_eq!(v.as_slice()[i], record.get(*field), "position {i} ({field:?})");
        assert_eq!(v.raw(*field), record.get(*field));
        assert_eq!(FEATURE_NAMES[i], field.column_name());
    }
    assert_eq!(FEATURE_NAMES[AFI_POSITION], "AFI");
}

#[test]
fn input_column_order_does_not_change_the_vector() {
    let forward = spreadsheet_row();
    let mut reversed = spreadsheet_row();
    reversed.reverse();
    let mut rotated = spreadsheet_row();
    rotated.rotate_left(5);
    let extra = spreadsheet_row()
        .into_iter()
        .chain([("Tahun", 2024.0), ("IPM", 71.3)])
        .collect::<Vec<_>>();

    let base = FeatureVector::assemble(&RegionRecord::from_columns(forward).unwrap(), 1.25).unwrap();
    for cols in [reversed, rotated, extra] {
        let v = FeatureVector::assemble(&RegionRecord::from_columns(cols).unwrap(), 1.25).unwrap();
        assert_eq!(v, base);
    }
}

#[test]
fn snake_case_keys_resolve_like_headers() {
    let keyed: Vec<(&str, f64)> = RawField::ALL
        .iter()
        .enumerate()
        .map(|(i, f)| (f.key(), (i + 1) as f64))
        .collect();
    assert_eq!(
        RegionRecord::from_columns(keyed).unwrap(),
        RegionRecord::from_columns(spreadsheet_row()).unwrap()
    );
}

#[test]
fn missing_column_is_schema_mismatch() {
    let cols: Vec<(&str, f64)> = spreadsheet_row()
        .into_iter()
        .filter(|(name, _)| *name != "Jumlah ATM")
        .collect();
    let err = RegionRecord::from_columns(cols).unwrap_err();
    assert!(
        matches!(err, AfiError::SchemaMismatch { ref field } if field == "Jumlah ATM"),
        "unexpected error: {err}"
    );
}

#[test]
fn non_finite_values_never_reach_the_predictor() {
    let mut record = RegionRecord::from_columns(spreadsheet_row()).unwrap();
    assert!(matches!(
        FeatureVector::assemble(&record, f64::NAN),
        Err(AfiError::SchemaMismatch { .. })
    ));

    record.loan_nominal = f64::INFINITY;
    let err = FeatureVector::assemble(&record, 0.0).unwrap_err();
    assert!(matches!(err, AfiError::SchemaMismatch { ref field } if field == "Nominal Kredit Perorangan Bank"));
}

#[test]
fn vector_serializes_as_a_flat_array() {
    let record = RegionRecord::from_columns(spreadsheet_row()).unwrap();
    let v = FeatureVector::assemble(&record, 0.5).unwrap();
    let json = serde_json::to_value(v).unwrap();
    assert_eq!(json.as_array().map(|a| a.len()), Some(FEATURE_COUNT));
}
