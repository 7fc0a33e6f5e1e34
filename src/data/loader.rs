use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float16Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::model::{
    AttributeValue, Cohort, CohortEntity, EventTable, PitchBounds, END_X, END_Y, X, Y,
};
use super::schema::{build_event_table, RawRow};

/// Nested sections of a provider event document that may carry an end point,
/// in lookup order.
const END_LOCATION_SECTIONS: [&str; 4] = ["pass", "carry", "shot", "goalkeeper"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a match event table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat columns (`player_name`, `type_name`, `x`, `y`, ...)
/// * `.json`    – records array, either flat or the provider's nested event
///   document (`type.name`, `location: [x, y]`, `pass.end_location`, ...)
/// * `.csv`     – header row with the flat column names
pub fn load_events(path: &Path, bounds: &PitchBounds) -> Result<EventTable> {
    let (columns, rows) = read_rows(path)?;
    if columns.is_empty() && rows.is_empty() {
        log::info!("{}: no events", path.display());
        return Ok(EventTable::default());
    }
    let table = build_event_table(columns, rows, bounds)
        .with_context(|| format!("invalid event table in {}", path.display()))?;
    log::info!(
        "Loaded {} events ({} columns) from {}",
        table.len(),
        table.column_names.len(),
        path.display()
    );
    Ok(table)
}

/// Load a comparison cohort: one row per entity, `name_column` names it,
/// numeric columns become metrics, everything else becomes an attribute.
///
/// A column counts as a metric only if it is numeric in every row, so a
/// text column with a few numeric-looking cells stays an attribute.
pub fn load_cohort(path: &Path, name_column: &str) -> Result<Cohort> {
    let (columns, rows) = read_rows(path)?;
    if !columns.iter().any(|c| c == name_column) {
        bail!("{}: cohort is missing name column '{name_column}'", path.display());
    }

    let metric_columns: BTreeSet<&str> = columns
        .iter()
        .filter(|c| c.as_str() != name_column)
        .filter(|c| {
            rows.iter()
                .all(|r| r.get(c.as_str()).and_then(AttributeValue::as_f64).is_some())
        })
        .map(String::as_str)
        .collect();

    let mut entities = Vec::with_capacity(rows.len());
    for (i, mut row) in rows.into_iter().enumerate() {
        let name = match row.remove(name_column) {
            Some(AttributeValue::String(s)) => s,
            Some(AttributeValue::Null) | None => bail!("Row {i}: missing '{name_column}'"),
            Some(other) => other.to_string(),
        };
        let mut metrics = BTreeMap::new();
        let mut attributes = BTreeMap::new();
        for (col, value) in row {
            match value.as_f64() {
                Some(v) if metric_columns.contains(col.as_str()) => {
                    metrics.insert(col, v);
                }
                _ => {
                    attributes.insert(col, value);
                }
            }
        }
        entities.push(CohortEntity {
            name,
            metrics,
            attributes,
        });
    }

    let cohort = Cohort::new(entities)
        .with_context(|| format!("invalid cohort in {}", path.display()))?;
    log::info!(
        "Loaded cohort of {} entities with {} metrics from {}",
        cohort.len(),
        metric_columns.len(),
        path.display()
    );
    Ok(cohort)
}

/// Read any supported file into ordered column names and untyped rows.
pub fn read_rows(path: &Path) -> Result<(Vec<String>, Vec<RawRow>)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => read_parquet(path),
        "json" => read_json(path),
        "csv" => read_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Track column names in order of first appearance.
#[derive(Default)]
struct ColumnOrder {
    names: Vec<String>,
    seen: BTreeSet<String>,
}

impl ColumnOrder {
    fn observe(&mut self, row: &RawRow) {
        for key in row.keys() {
            if self.seen.insert(key.clone()) {
                self.names.push(key.clone());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema: a top-level array of objects.
///
/// Nested objects are flattened with `_` separators, so the provider's
/// `{"type": {"name": "Pass"}}` becomes `type_name` and
/// `{"pass": {"outcome": {"name": "Incomplete"}}}` becomes
/// `pass_outcome_name`. A `location` array becomes `x`/`y`, and the first
/// `<section>_end_location` array becomes `end_x`/`end_y`.
fn read_json(path: &Path) -> Result<(Vec<String>, Vec<RawRow>)> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns = ColumnOrder::default();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = RawRow::new();
        flatten_object("", obj, &mut row);
        split_locations(i, &mut row)?;

        columns.observe(&row);
        rows.push(row);
    }

    Ok((columns.names, rows))
}

fn flatten_object(prefix: &str, obj: &JsonMap<String, JsonValue>, out: &mut RawRow) {
    for (key, val) in obj {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}_{key}")
        };
        match val {
            JsonValue::Object(inner) => flatten_object(&name, inner, out),
            other => {
                out.insert(name, json_to_attribute(other));
            }
        }
    }
}

/// Replace coordinate arrays, which [`json_to_attribute`] keeps as text, by
/// scalar coordinate columns.
fn split_locations(row_no: usize, row: &mut RawRow) -> Result<()> {
    if let Some(raw) = row.remove("location") {
        let (x, y) = coordinate_array(&raw).with_context(|| format!("Row {row_no}: 'location'"))?;
        row.insert(X.to_string(), x);
        row.insert(Y.to_string(), y);
    }
    for section in END_LOCATION_SECTIONS {
        let key = format!("{section}_end_location");
        let Some(raw) = row.remove(&key) else {
            continue;
        };
        if row.contains_key(END_X) {
            continue;
        }
        let (x, y) = coordinate_array(&raw).with_context(|| format!("Row {row_no}: '{key}'"))?;
        row.insert(END_X.to_string(), x);
        row.insert(END_Y.to_string(), y);
    }
    Ok(())
}

/// Parse the text form of a `[x, y]` or `[x, y, z]` array.
fn coordinate_array(raw: &AttributeValue) -> Result<(AttributeValue, AttributeValue)> {
    let text = raw.as_str().context("expected a coordinate array")?;
    let values: Vec<f64> = serde_json::from_str(text).context("expected a numeric array")?;
    match values.as_slice() {
        [x, y, ..] => Ok((AttributeValue::Float(*x), AttributeValue::Float(*y))),
        _ => bail!("expected at least 2 coordinates, got {}", values.len()),
    }
}

fn json_to_attribute(val: &JsonValue) -> AttributeValue {
    match val {
        JsonValue::String(s) => AttributeValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttributeValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                AttributeValue::Float(f)
            } else {
                AttributeValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => AttributeValue::Bool(*b),
        JsonValue::Null => AttributeValue::Null,
        other => AttributeValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one event (or entity) per row.
/// Empty cells are null.
fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<RawRow>)> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), guess_attribute_type(value)))
            .collect();
        rows.push(row);
    }

    Ok((headers, rows))
}

fn guess_attribute_type(s: &str) -> AttributeValue {
    if s.is_empty() {
        return AttributeValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return AttributeValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return AttributeValue::Float(f);
    }
    if s == "true" || s == "false" {
        return AttributeValue::Bool(s == "true");
    }
    AttributeValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per field.
///
/// Works with event tables written by both **Pandas** (`df.to_parquet()`)
/// and **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<(Vec<String>, Vec<RawRow>)> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let raw: RawRow = columns
                .iter()
                .zip(batch.columns())
                .map(|(name, col)| (name.clone(), extract_attribute(col, row)))
                .collect();
            rows.push(raw);
        }
    }

    Ok((columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_attribute(col: &ArrayRef, row: usize) -> AttributeValue {
    if col.is_null(row) {
        return AttributeValue::Null;
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| AttributeValue::String(a.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| AttributeValue::String(a.value(row).to_string())),
        DataType::Int8 => col
            .as_primitive_opt::<Int8Type>()
            .map(|a| AttributeValue::Integer(i64::from(a.value(row)))),
        DataType::Int16 => col
            .as_primitive_opt::<Int16Type>()
            .map(|a| AttributeValue::Integer(i64::from(a.value(row)))),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| AttributeValue::Integer(i64::from(a.value(row)))),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| AttributeValue::Integer(a.value(row))),
        DataType::UInt8 => col
            .as_primitive_opt::<UInt8Type>()
            .map(|a| AttributeValue::Integer(i64::from(a.value(row)))),
        DataType::UInt16 => col
            .as_primitive_opt::<UInt16Type>()
            .map(|a| AttributeValue::Integer(i64::from(a.value(row)))),
        DataType::UInt32 => col
            .as_primitive_opt::<UInt32Type>()
            .map(|a| AttributeValue::Integer(i64::from(a.value(row)))),
        // values past i64::MAX fall through to text
        DataType::UInt64 => col
            .as_primitive_opt::<UInt64Type>()
            .and_then(|a| i64::try_from(a.value(row)).ok())
            .map(AttributeValue::Integer),
        DataType::Float16 => col
            .as_primitive_opt::<Float16Type>()
            .map(|a| AttributeValue::Float(a.value(row).to_f64())),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| AttributeValue::Float(f64::from(a.value(row)))),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| AttributeValue::Float(a.value(row))),
        DataType::Boolean => col
            .as_boolean_opt()
            .map(|a| AttributeValue::Bool(a.value(row))),
        _ => None,
    };
    value.unwrap_or_else(|| match array_value_to_string(col, row) {
        Ok(s) => AttributeValue::String(s),
        Err(_) => AttributeValue::String(format!("{:?}", col.data_type())),
    })
}
