//! End-to-end runs: file on disk → loader → pipeline.

use std::io::Write;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use pretty_assertions::assert_eq;

use pitchlens::data::loader::{load_cohort, load_events};
use pitchlens::data::model::{Displacement, Location, PitchBounds};
use pitchlens::{
    filter_and_vectorize, normalize, normalize_with, Band, SchemaError, ZeroVariancePolicy,
};

fn temp_with_suffix(suffix: &str) -> tempfile::NamedTempFile {
    tempfile::Builder::new().suffix(suffix).tempfile().unwrap()
}

fn write_parquet(batch: &RecordBatch) -> tempfile::NamedTempFile {
    let file = temp_with_suffix(".parquet");
    let sink = file.as_file().try_clone().unwrap();
    let mut writer = ArrowWriter::try_new(sink, batch.schema(), None).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
    file
}

fn event_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("player_name", DataType::Utf8, true),
        Field::new("type_name", DataType::Utf8, false),
        Field::new("x", DataType::Float64, true),
        Field::new("y", DataType::Float64, true),
        Field::new("end_x", DataType::Float64, true),
        Field::new("end_y", DataType::Float64, true),
        Field::new("minute", DataType::Int64, false),
        Field::new("second", DataType::Int64, false),
        Field::new("outcome_name", DataType::Utf8, true),
        Field::new("possession", DataType::Int64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec![
            None,
            Some("Toni Kroos"),
            Some("Other"),
            Some("Toni Kroos"),
            Some("Toni Kroos"),
        ])),
        Arc::new(StringArray::from(vec!["Half Start", "Pass", "Pass", "Carry", "Pass"])),
        Arc::new(Float64Array::from(vec![None, Some(10.0), Some(0.0), Some(15.0), Some(60.0)])),
        Arc::new(Float64Array::from(vec![None, Some(20.0), Some(0.0), Some(25.0), Some(40.0)])),
        Arc::new(Float64Array::from(vec![None, Some(15.0), Some(1.0), Some(18.0), Some(100.0)])),
        Arc::new(Float64Array::from(vec![None, Some(25.0), Some(1.0), Some(30.0), Some(10.0)])),
        Arc::new(Int64Array::from(vec![0, 3, 1, 3, 44])),
        Arc::new(Int64Array::from(vec![0, 10, 0, 12, 59])),
        Arc::new(StringArray::from(vec![None, Some("complete"), None, None, Some("Out")])),
        Arc::new(Int64Array::from(vec![1, 2, 2, 2, 9])),
    ];
    RecordBatch::try_new(schema, columns).unwrap()
}

#[test]
fn parquet_events_to_pass_vectors() {
    let file = write_parquet(&event_batch());
    let table = load_events(file.path(), &PitchBounds::default()).unwrap();
    assert_eq!(table.len(), 5);
    assert_eq!(
        table.players().into_iter().collect::<Vec<_>>(),
        vec!["Other", "Toni Kroos"]
    );

    let vectors = filter_and_vectorize(&table.events, "Toni Kroos", "Pass").unwrap();
    assert_eq!(vectors.len(), 2);

    assert_eq!(vectors[0].origin, Location::new(10.0, 20.0));
    assert_eq!(vectors[0].displacement, Displacement { dx: 5.0, dy: 5.0 });
    assert_eq!((vectors[0].minute, vectors[0].second), (3, 10));
    assert_eq!(vectors[0].outcome.as_deref(), Some("complete"));

    assert_eq!(vectors[1].displacement, Displacement { dx: 40.0, dy: -30.0 });
    assert_eq!(vectors[1].length(), 50.0);
    assert_eq!(vectors[1].outcome.as_deref(), Some("Out"));
}

#[test]
fn narrower_pitch_rejects_wide_coordinates() {
    let file = write_parquet(&event_batch());
    let pitch = PitchBounds {
        length: 120.0,
        width: 30.0,
    };
    let err = load_events(file.path(), &pitch).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchemaError>(),
        Some(SchemaError::OutOfBounds { row: 4, .. })
    ));
}

#[test]
fn nested_json_match_to_pass_vectors() {
    let mut file = temp_with_suffix(".json");
    file.write_all(
        br#"[
            {"minute": 0, "second": 0, "type": {"name": "Starting XI"},
             "tactics": {"formation": 4231, "lineup": []}},
            {"minute": 12, "second": 5, "type": {"name": "Pass"},
             "player": {"name": "Toni Kroos"}, "location": [50.0, 40.0],
             "pass": {"end_location": [70.0, 20.0], "length": 28.28}},
            {"minute": 12, "second": 9, "type": {"name": "Ball Receipt*"},
             "player": {"name": "Jamal Musiala"}, "location": [70.0, 20.0]}
        ]"#,
    )
    .unwrap();

    let table = load_events(file.path(), &PitchBounds::default()).unwrap();
    let vectors = filter_and_vectorize(&table.events, "Toni Kroos", "Pass").unwrap();
    assert_eq!(vectors.len(), 1);
    assert_eq!(vectors[0].end(), Location::new(70.0, 20.0));
    assert_eq!(vectors[0].outcome, None);

    // the receipt has no end location but is never selected
    assert!(filter_and_vectorize(&table.events, "Jamal Musiala", "Pass")
        .unwrap()
        .is_empty());
    assert_eq!(
        filter_and_vectorize(&table.events, "Jamal Musiala", "Ball Receipt*"),
        Err(SchemaError::MissingField {
            row: 2,
            field: "end_x".into()
        })
    );
}

#[test]
fn cohort_csv_to_bands() {
    let mut file = temp_with_suffix(".csv");
    file.write_all(
        "Player,Team,Pass_Accuracy,Key_Passes_90,Shirt\n\
         A,X,10,2.0,8\n\
         B,Y,20,2.0,8\n\
         C,Z,30,2.0,8\n"
            .as_bytes(),
    )
    .unwrap();

    let cohort = load_cohort(file.path(), "Player").unwrap();
    let table = normalize(cohort.entities(), &["Pass_Accuracy", "Key_Passes_90"]).unwrap();

    let bands: Vec<Band> = table
        .column("Pass_Accuracy")
        .unwrap()
        .scores
        .iter()
        .map(|s| s.band())
        .collect();
    assert_eq!(bands, vec![Band::Negative, Band::Neutral, Band::Positive]);
    assert_eq!(table.failures().len(), 1);

    let lenient = normalize_with(
        cohort.entities(),
        &["Key_Passes_90", "Shirt"],
        ZeroVariancePolicy::Zero,
    )
    .unwrap();
    assert!(lenient.is_complete());
    assert!(lenient.scores().all(|s| s.z == 0.0 && s.band() == Band::Neutral));
}
