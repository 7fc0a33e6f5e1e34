use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Column names of the flat event table
// ---------------------------------------------------------------------------

pub const PLAYER_NAME: &str = "player_name";
pub const TYPE_NAME: &str = "type_name";
pub const X: &str = "x";
pub const Y: &str = "y";
pub const END_X: &str = "end_x";
pub const END_Y: &str = "end_y";
pub const MINUTE: &str = "minute";
pub const SECOND: &str = "second";

/// Outcome columns in lookup order. The provider only fills the generic one
/// for some action types, so the pass-specific one is a fallback.
pub const OUTCOME_COLUMNS: [&str; 2] = ["outcome_name", "pass_outcome_name"];

/// Columns every event table must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    PLAYER_NAME, TYPE_NAME, X, Y, END_X, END_Y, MINUTE, SECOND,
];

// ---------------------------------------------------------------------------
// AttributeValue – a single dynamically typed cell
// ---------------------------------------------------------------------------

/// A cell of a loaded table that the core does not interpret itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{s}"),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::Float(v) => write!(f, "{v:.2}"),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Null => write!(f, "<null>"),
        }
    }
}

impl AttributeValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(v) => Some(*v),
            AttributeValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integral view; floats are accepted only when they carry no fraction.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Pitch geometry
// ---------------------------------------------------------------------------

/// Playing-field extent. Coordinates run from 0 to `length` along x and from
/// 0 to `width` along y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchBounds {
    pub length: f64,
    pub width: f64,
}

impl Default for PitchBounds {
    fn default() -> Self {
        Self {
            length: 120.0,
            width: 100.0,
        }
    }
}

impl PitchBounds {
    pub fn contains(&self, loc: Location) -> bool {
        (0.0..=self.length).contains(&loc.x) && (0.0..=self.width).contains(&loc.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Displacement {
    pub dx: f64,
    pub dy: f64,
}

impl Displacement {
    /// Vector from `from` to `to`.
    pub fn between(from: Location, to: Location) -> Self {
        Self {
            dx: to.x - from.x,
            dy: to.y - from.y,
        }
    }

    pub fn length(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

// ---------------------------------------------------------------------------
// EventRecord – one row of the provider's event table
// ---------------------------------------------------------------------------

/// One observed action in a match.
///
/// `player_name` is absent for provider rows that belong to no player
/// (lineups, period markers); `location`/`end_location` are absent for
/// actions without a spatial component. Both coordinates of a pair are
/// always present together.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Position in the source table, 0-based.
    pub row: usize,
    pub player_name: Option<String>,
    pub type_name: String,
    pub location: Option<Location>,
    pub end_location: Option<Location>,
    pub minute: u32,
    pub second: u32,
    pub outcome: Option<String>,
    /// Every other column, untouched.
    pub extra: BTreeMap<String, AttributeValue>,
}

// ---------------------------------------------------------------------------
// EventTable – the complete loaded event log of a match
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct EventTable {
    pub events: Vec<EventRecord>,
    /// Ordered column names as they appeared in the source.
    pub column_names: Vec<String>,
}

impl EventTable {
    pub fn new(events: Vec<EventRecord>, column_names: Vec<String>) -> Self {
        Self {
            events,
            column_names,
        }
    }

    /// Distinct player names, sorted.
    pub fn players(&self) -> BTreeSet<&str> {
        self.events
            .iter()
            .filter_map(|ev| ev.player_name.as_deref())
            .collect()
    }

    /// Distinct action types, sorted.
    pub fn action_types(&self) -> BTreeSet<&str> {
        self.events.iter().map(|ev| ev.type_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PassVector – derived directed action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassVector {
    pub origin: Location,
    pub displacement: Displacement,
    pub minute: u32,
    pub second: u32,
    pub outcome: Option<String>,
}

impl PassVector {
    pub fn end(&self) -> Location {
        Location::new(
            self.origin.x + self.displacement.dx,
            self.origin.y + self.displacement.dy,
        )
    }

    pub fn length(&self) -> f64 {
        self.displacement.length()
    }
}

// ---------------------------------------------------------------------------
// Cohort
// ---------------------------------------------------------------------------

/// One comparable unit of a cohort, usually a player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortEntity {
    pub name: String,
    pub metrics: BTreeMap<String, f64>,
    /// Non-metric columns such as the team.
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl CohortEntity {
    pub fn new<I, K>(name: impl Into<String>, metrics: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            name: name.into(),
            metrics: metrics.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Checked metric lookup. NaN and infinities are rejected.
    pub fn metric(&self, metric: &str) -> Result<f64, SchemaError> {
        let value = self
            .metrics
            .get(metric)
            .copied()
            .ok_or_else(|| SchemaError::UnknownMetric {
                entity: self.name.clone(),
                metric: metric.to_string(),
            })?;
        if !value.is_finite() {
            return Err(SchemaError::NonFiniteMetric {
                entity: self.name.clone(),
                metric: metric.to_string(),
                value,
            });
        }
        Ok(value)
    }
}

/// A validated comparison set: names are unique, every entity defines the
/// same metric set, and every metric value is finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cohort {
    entities: Vec<CohortEntity>,
}

impl Cohort {
    pub fn new(entities: Vec<CohortEntity>) -> Result<Self, SchemaError> {
        let mut seen = BTreeSet::new();
        for entity in &entities {
            if !seen.insert(entity.name.as_str()) {
                return Err(SchemaError::DuplicateEntity {
                    name: entity.name.clone(),
                });
            }
        }
        for entity in &entities {
            for metric in entity.metrics.keys() {
                entity.metric(metric)?;
            }
        }
        if let Some((first, rest)) = entities.split_first() {
            for entity in rest {
                if !entity.metrics.keys().eq(first.metrics.keys()) {
                    return Err(SchemaError::MetricSetMismatch {
                        entity: entity.name.clone(),
                        reference: first.name.clone(),
                    });
                }
            }
        }
        Ok(Self { entities })
    }

    pub fn entities(&self) -> &[CohortEntity] {
        &self.entities
    }

    pub fn get(&self, name: &str) -> Option<&CohortEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Metric names shared by every entity, sorted.
    pub fn metric_names(&self) -> Vec<&str> {
        self.entities
            .first()
            .map(|e| e.metrics.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

// ---------------------------------------------------------------------------
// NormalizedScore – one standardized (entity, metric) value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedScore {
    pub entity: String,
    pub metric: String,
    pub z: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_bounds_are_inclusive() {
        let pitch = PitchBounds::default();
        assert!(pitch.contains(Location::new(0.0, 0.0)));
        assert!(pitch.contains(Location::new(120.0, 100.0)));
        assert!(!pitch.contains(Location::new(120.5, 50.0)));
        assert!(!pitch.contains(Location::new(60.0, -0.1)));
    }

    #[test]
    fn pass_vector_end_and_length() {
        let pv = PassVector {
            origin: Location::new(10.0, 20.0),
            displacement: Displacement { dx: 3.0, dy: 4.0 },
            minute: 0,
            second: 0,
            outcome: None,
        };
        assert_eq!(pv.end(), Location::new(13.0, 24.0));
        assert_eq!(pv.length(), 5.0);
    }

    #[test]
    fn cohort_rejects_duplicate_names() {
        let err = Cohort::new(vec![
            CohortEntity::new("A", [("m", 1.0)]),
            CohortEntity::new("A", [("m", 2.0)]),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateEntity { name: "A".into() });
    }

    #[test]
    fn cohort_rejects_mismatched_metric_sets() {
        let err = Cohort::new(vec![
            CohortEntity::new("A", [("m", 1.0), ("n", 1.0)]),
            CohortEntity::new("B", [("m", 2.0)]),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::MetricSetMismatch { .. }));
    }

    #[test]
    fn cohort_rejects_non_finite_metrics() {
        let err = Cohort::new(vec![
            CohortEntity::new("A", [("m", 1.0)]),
            CohortEntity::new("B", [("m", f64::INFINITY)]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::NonFiniteMetric {
                entity: "B".into(),
                metric: "m".into(),
                value: f64::INFINITY,
            }
        );

        let nan = CohortEntity::new("C", [("m", f64::NAN)]);
        assert!(matches!(
            nan.metric("m"),
            Err(SchemaError::NonFiniteMetric { .. })
        ));
    }

    #[test]
    fn as_i64_rejects_fractional_floats() {
        assert_eq!(AttributeValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(AttributeValue::Float(3.5).as_i64(), None);
        assert_eq!(AttributeValue::String("3".into()).as_i64(), None);
    }
}
