//! Data layer: event and cohort types, loading, and filtering.
//!
//! Architecture:
//! ```text
//!  .parquet / .json / .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → RawRow columns
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  schema   │  checked RawRow → EventRecord, SchemaError on violations
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────┐
//!   │ EventTable  │  Vec<EventRecord>, column names
//!   └────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  (player, action type) predicate → matching rows
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
