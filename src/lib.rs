//! Pass-map vectorization and cohort z-score comparison over football event
//! data.
//!
//! Two independent pipelines:
//!
//! - [`analysis::pass_map`]: select one player's actions of one type from a
//!   match event table and turn each into an origin + displacement vector.
//! - [`analysis::normalize`]: standardize a small cohort's metrics into
//!   z-scores, with [`analysis::band`] for a qualitative reading.
//!
//! Both are pure, synchronous functions over tables already in memory.
//! Loading lives in [`data::loader`]; rendering is left to the caller.
//!
//! ```
//! use pitchlens::analysis::normalize::normalize;
//! use pitchlens::data::model::CohortEntity;
//!
//! let cohort = vec![
//!     CohortEntity::new("A", [("m", 10.0)]),
//!     CohortEntity::new("B", [("m", 20.0)]),
//!     CohortEntity::new("C", [("m", 30.0)]),
//! ];
//! let table = normalize(&cohort, &["m"]).unwrap();
//! assert_eq!(table.get("A", "m"), Some(-1.0));
//! ```

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod reference;

pub use analysis::band::{band, Band};
pub use analysis::normalize::{normalize, normalize_with, ScoreTable};
pub use analysis::pass_map::filter_and_vectorize;
pub use analysis::stats::ZeroVariancePolicy;
pub use error::{NormalizeError, SchemaError};
