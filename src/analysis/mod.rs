//! Analysis layer: the two independent pipelines over loaded data.
//!
//! ```text
//!  EventTable ──► pass_map ──► Vec<PassVector>
//!
//!  Cohort ──► normalize (stats) ──► ScoreTable ──► band
//! ```

pub mod band;
pub mod normalize;
pub mod pass_map;
pub mod stats;
