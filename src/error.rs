use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// A data-contract violation in an event table or cohort.
///
/// These are never transient: the input is wrong and retrying with the same
/// input fails the same way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("table is missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: String },

    #[error("row {row}: field '{field}' is malformed: {reason}")]
    InvalidField {
        row: usize,
        field: String,
        reason: String,
    },

    #[error("row {row}: '{present}' is set but '{missing}' is not")]
    PartialLocation {
        row: usize,
        present: String,
        missing: String,
    },

    #[error("row {row}: ({x}, {y}) lies outside the {length}x{width} pitch")]
    OutOfBounds {
        row: usize,
        x: f64,
        y: f64,
        length: f64,
        width: f64,
    },

    #[error("entity '{entity}' does not define metric '{metric}'")]
    UnknownMetric { entity: String, metric: String },

    #[error("entity '{entity}': metric '{metric}' is not a finite number ({value})")]
    NonFiniteMetric {
        entity: String,
        metric: String,
        value: f64,
    },

    #[error("entity '{entity}' defines a different metric set than '{reference}'")]
    MetricSetMismatch { entity: String, reference: String },

    #[error("duplicate entity name '{name}'")]
    DuplicateEntity { name: String },
}

/// Failure of a cohort normalization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("cohort has {size} entities, at least 2 are required")]
    InsufficientCohort { size: usize },

    #[error("metric '{metric}' has zero variance (every entity has {value})")]
    DegenerateMetric { metric: String, value: f64 },

    #[error("metric '{metric}' is spread too wide to standardize")]
    SpreadOverflow { metric: String },
}
