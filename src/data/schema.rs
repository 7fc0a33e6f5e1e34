use std::collections::BTreeMap;

use crate::error::SchemaError;

use super::model::{
    AttributeValue, EventRecord, EventTable, Location, PitchBounds, END_X, END_Y, MINUTE,
    OUTCOME_COLUMNS, PLAYER_NAME, REQUIRED_COLUMNS, SECOND, TYPE_NAME, X, Y,
};

/// One untyped row as produced by the file loaders: column name → cell.
pub type RawRow = BTreeMap<String, AttributeValue>;

// ---------------------------------------------------------------------------
// Table-level checks
// ---------------------------------------------------------------------------

/// Fail with the first required column that `columns` does not carry.
pub fn check_columns<S: AsRef<str>>(columns: &[S]) -> Result<(), SchemaError> {
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c.as_ref() == required) {
            return Err(SchemaError::MissingColumn {
                column: required.to_string(),
            });
        }
    }
    Ok(())
}

/// Validate the column set, then convert every row into a typed record.
pub fn build_event_table(
    column_names: Vec<String>,
    rows: Vec<RawRow>,
    bounds: &PitchBounds,
) -> Result<EventTable, SchemaError> {
    check_columns(&column_names)?;
    let events = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| event_from_row(i, row, bounds))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EventTable::new(events, column_names))
}

// ---------------------------------------------------------------------------
// Row → EventRecord
// ---------------------------------------------------------------------------

/// Convert one raw row. Consumed columns are removed; whatever remains ends
/// up in [`EventRecord::extra`].
pub fn event_from_row(
    row_no: usize,
    mut row: RawRow,
    bounds: &PitchBounds,
) -> Result<EventRecord, SchemaError> {
    let player_name = optional_string(row_no, &mut row, PLAYER_NAME)?;
    let type_name = optional_string(row_no, &mut row, TYPE_NAME)?.ok_or_else(|| {
        SchemaError::MissingField {
            row: row_no,
            field: TYPE_NAME.to_string(),
        }
    })?;
    let location = location_pair(row_no, &mut row, X, Y, bounds)?;
    let end_location = location_pair(row_no, &mut row, END_X, END_Y, bounds)?;
    let minute = clock_field(row_no, &mut row, MINUTE)?;
    let second = clock_field(row_no, &mut row, SECOND)?;

    let mut outcome = None;
    for column in OUTCOME_COLUMNS {
        let value = optional_string(row_no, &mut row, column)?;
        if outcome.is_none() {
            outcome = value;
        }
    }

    Ok(EventRecord {
        row: row_no,
        player_name,
        type_name,
        location,
        end_location,
        minute,
        second,
        outcome,
        extra: row,
    })
}

fn take(row: &mut RawRow, column: &str) -> Option<AttributeValue> {
    row.remove(column).filter(|v| !v.is_null())
}

fn optional_string(
    row_no: usize,
    row: &mut RawRow,
    column: &str,
) -> Result<Option<String>, SchemaError> {
    match take(row, column) {
        None => Ok(None),
        Some(AttributeValue::String(s)) => Ok(Some(s)),
        Some(other) => Err(SchemaError::InvalidField {
            row: row_no,
            field: column.to_string(),
            reason: format!("expected text, got '{other}'"),
        }),
    }
}

fn coordinate(row_no: usize, value: AttributeValue, column: &str) -> Result<f64, SchemaError> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SchemaError::InvalidField {
            row: row_no,
            field: column.to_string(),
            reason: format!("expected a finite number, got '{value}'"),
        })
}

fn location_pair(
    row_no: usize,
    row: &mut RawRow,
    x_col: &str,
    y_col: &str,
    bounds: &PitchBounds,
) -> Result<Option<Location>, SchemaError> {
    let loc = match (take(row, x_col), take(row, y_col)) {
        (None, None) => return Ok(None),
        (Some(_), None) => {
            return Err(SchemaError::PartialLocation {
                row: row_no,
                present: x_col.to_string(),
                missing: y_col.to_string(),
            })
        }
        (None, Some(_)) => {
            return Err(SchemaError::PartialLocation {
                row: row_no,
                present: y_col.to_string(),
                missing: x_col.to_string(),
            })
        }
        (Some(x), Some(y)) => Location::new(
            coordinate(row_no, x, x_col)?,
            coordinate(row_no, y, y_col)?,
        ),
    };
    if !bounds.contains(loc) {
        return Err(SchemaError::OutOfBounds {
            row: row_no,
            x: loc.x,
            y: loc.y,
            length: bounds.length,
            width: bounds.width,
        });
    }
    Ok(Some(loc))
}

fn clock_field(row_no: usize, row: &mut RawRow, column: &str) -> Result<u32, SchemaError> {
    let value = take(row, column).ok_or_else(|| SchemaError::MissingField {
        row: row_no,
        field: column.to_string(),
    })?;
    value
        .as_i64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| SchemaError::InvalidField {
            row: row_no,
            field: column.to_string(),
            reason: format!("expected a non-negative integer, got '{value}'"),
        })
}
