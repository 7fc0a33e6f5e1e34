//! Cohort z-score normalization.
//!
//! Every requested metric is standardized independently: its mean and sample
//! standard deviation are computed over the whole cohort and each entity's
//! value is expressed in standard deviations from the mean. A metric whose
//! values are all identical is handled by the caller's
//! [`ZeroVariancePolicy`]; under [`ZeroVariancePolicy::Reject`] it is
//! reported in [`ScoreTable::failures`] while the remaining metrics are
//! still scored.

use serde::Serialize;

use crate::data::model::{CohortEntity, NormalizedScore};
use crate::error::NormalizeError;

use super::band::Band;
use super::stats::{standardize, MetricStats, StandardizeError, ZeroVariancePolicy};

impl NormalizedScore {
    pub fn band(&self) -> Band {
        Band::from_z(self.z)
    }
}

/// All scores of one metric, in cohort order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricColumn {
    pub metric: String,
    pub stats: MetricStats,
    pub scores: Vec<NormalizedScore>,
}

/// Result of [`normalize`]: scored metrics in request order plus the metrics
/// that could not be scored.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    entities: Vec<String>,
    columns: Vec<MetricColumn>,
    failures: Vec<NormalizeError>,
}

impl ScoreTable {
    /// Entity names in cohort order.
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn columns(&self) -> &[MetricColumn] {
        &self.columns
    }

    pub fn column(&self, metric: &str) -> Option<&MetricColumn> {
        self.columns.iter().find(|c| c.metric == metric)
    }

    pub fn get(&self, entity: &str, metric: &str) -> Option<f64> {
        self.column(metric)?
            .scores
            .iter()
            .find(|s| s.entity == entity)
            .map(|s| s.z)
    }

    /// One entity across every scored metric, in metric order.
    pub fn profile(&self, entity: &str) -> Vec<&NormalizedScore> {
        self.columns
            .iter()
            .filter_map(|c| c.scores.iter().find(|s| s.entity == entity))
            .collect()
    }

    /// Every score, metric-major.
    pub fn scores(&self) -> impl Iterator<Item = &NormalizedScore> {
        self.columns.iter().flat_map(|c| c.scores.iter())
    }

    /// Metrics that were requested but not scored.
    pub fn failures(&self) -> &[NormalizeError] {
        &self.failures
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn the first per-metric failure into an error.
    pub fn into_complete(mut self) -> Result<Self, NormalizeError> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(self.failures.swap_remove(0))
        }
    }
}

/// Normalize with the default policy, [`ZeroVariancePolicy::Reject`].
pub fn normalize<S: AsRef<str>>(
    entities: &[CohortEntity],
    metrics: &[S],
) -> Result<ScoreTable, NormalizeError> {
    normalize_with(entities, metrics, ZeroVariancePolicy::default())
}

/// Compute the z-score of every entity on every requested metric.
///
/// Fails as a whole when the cohort has fewer than two entities or when a
/// requested metric is missing or non-finite for some entity. Degenerate
/// metrics are handled per metric according to `policy`. A metric requested
/// twice is scored once.
pub fn normalize_with<S: AsRef<str>>(
    entities: &[CohortEntity],
    metrics: &[S],
    policy: ZeroVariancePolicy,
) -> Result<ScoreTable, NormalizeError> {
    if entities.len() < 2 {
        return Err(NormalizeError::InsufficientCohort {
            size: entities.len(),
        });
    }

    let mut requested: Vec<&str> = Vec::with_capacity(metrics.len());
    for metric in metrics {
        let metric: &str = metric.as_ref();
        if !requested.contains(&metric) {
            requested.push(metric);
        }
    }

    // Resolve every value up front so a schema violation aborts the batch
    // before anything is scored.
    let values = requested
        .iter()
        .map(|metric| {
            entities
                .iter()
                .map(|e| e.metric(metric))
                .collect::<Result<Vec<f64>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut columns = Vec::with_capacity(requested.len());
    let mut failures = Vec::new();

    for (metric, column) in requested.iter().zip(&values) {
        match standardize(column, policy) {
            Ok((stats, z)) => {
                let scores = entities
                    .iter()
                    .zip(z)
                    .map(|(e, z)| NormalizedScore {
                        entity: e.name.clone(),
                        metric: (*metric).to_string(),
                        z,
                    })
                    .collect();
                columns.push(MetricColumn {
                    metric: (*metric).to_string(),
                    stats,
                    scores,
                });
            }
            Err(StandardizeError::ZeroVariance(value)) => {
                log::warn!("metric {metric:?} has zero variance across the cohort");
                failures.push(NormalizeError::DegenerateMetric {
                    metric: (*metric).to_string(),
                    value,
                });
            }
            Err(StandardizeError::NonFinite(_)) => {
                log::warn!("metric {metric:?} is spread too wide to standardize");
                failures.push(NormalizeError::SpreadOverflow {
                    metric: (*metric).to_string(),
                });
            }
            Err(StandardizeError::TooFewValues(size)) => {
                return Err(NormalizeError::InsufficientCohort { size });
            }
        }
    }

    log::debug!(
        "normalized {} metrics over {} entities ({} degenerate)",
        columns.len(),
        entities.len(),
        failures.len()
    );

    Ok(ScoreTable {
        entities: entities.iter().map(|e| e.name.clone()).collect(),
        columns,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::SchemaError;

    fn abc() -> Vec<CohortEntity> {
        vec![
            CohortEntity::new("A", [("m", 10.0), ("flat", 3.0)]),
            CohortEntity::new("B", [("m", 20.0), ("flat", 3.0)]),
            CohortEntity::new("C", [("m", 30.0), ("flat", 3.0)]),
        ]
    }

    #[test]
    fn abc_scenario() {
        let table = normalize(&abc(), &["m"]).unwrap();
        let column = table.column("m").unwrap();
        assert_eq!(column.stats.mean, 20.0);
        assert_eq!(column.stats.std_dev, 10.0);
        let z: Vec<f64> = column.scores.iter().map(|s| s.z).collect();
        assert_eq!(z, vec![-1.0, 0.0, 1.0]);
        assert_eq!(table.get("C", "m"), Some(1.0));
        assert!(table.is_complete());
    }

    #[test]
    fn single_entity_is_insufficient() {
        let cohort = vec![CohortEntity::new("A", [("m", 1.0)])];
        assert_eq!(
            normalize(&cohort, &["m"]),
            Err(NormalizeError::InsufficientCohort { size: 1 })
        );
        assert_eq!(
            normalize::<&str>(&[], &[]),
            Err(NormalizeError::InsufficientCohort { size: 0 })
        );
    }

    #[test]
    fn unknown_metric_is_a_schema_error() {
        let err = normalize(&abc(), &["m", "nope"]).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::Schema(SchemaError::UnknownMetric {
                entity: "A".into(),
                metric: "nope".into(),
            })
        );
    }

    #[test]
    fn degenerate_metric_is_rejected_alone() {
        let table = normalize(&abc(), &["flat", "m"]).unwrap();
        assert_eq!(table.columns().len(), 1);
        assert_eq!(table.columns()[0].metric, "m");
        assert_eq!(
            table.failures(),
            &[NormalizeError::DegenerateMetric {
                metric: "flat".into(),
                value: 3.0,
            }]
        );
        assert!(table.clone().into_complete().is_err());
    }

    #[test]
    fn degenerate_metric_scores_zero_under_zero_policy() {
        let table = normalize_with(&abc(), &["flat", "m"], ZeroVariancePolicy::Zero).unwrap();
        assert!(table.is_complete());
        let flat: Vec<f64> = table.column("flat").unwrap().scores.iter().map(|s| s.z).collect();
        assert_eq!(flat, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn non_finite_value_aborts_the_batch() {
        let cohort = vec![
            CohortEntity::new("A", [("m", 10.0)]),
            CohortEntity::new("B", [("m", f64::NAN)]),
            CohortEntity::new("C", [("m", 30.0)]),
        ];
        let err = normalize(&cohort, &["m"]).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::Schema(SchemaError::NonFiniteMetric { ref entity, .. }) if entity == "B"
        ));
    }

    #[test]
    fn overflowing_spread_is_reported_per_metric() {
        let cohort = vec![
            CohortEntity::new("A", [("huge", f64::MAX), ("m", 1.0)]),
            CohortEntity::new("B", [("huge", -f64::MAX), ("m", 2.0)]),
        ];
        let table = normalize(&cohort, &["huge", "m"]).unwrap();
        assert_eq!(
            table.failures(),
            &[NormalizeError::SpreadOverflow {
                metric: "huge".into()
            }]
        );
        assert_eq!(table.columns().len(), 1);
    }

    #[test]
    fn extreme_but_finite_values_are_standardized() {
        let cohort = vec![
            CohortEntity::new("A", [("m", 1e308)]),
            CohortEntity::new("B", [("m", -1e308)]),
            CohortEntity::new("C", [("m", 0.0)]),
        ];
        let table = normalize(&cohort, &["m"]).unwrap();
        assert!(table.is_complete());
        let a = table.get("A", "m").unwrap();
        let b = table.get("B", "m").unwrap();
        assert!((a - 1.0).abs() < 1e-12 && (b + 1.0).abs() < 1e-12);
    }

    #[test]
    fn duplicate_metric_requests_are_scored_once() {
        let table = normalize(&abc(), &["m", "m"]).unwrap();
        assert_eq!(table.columns().len(), 1);
        assert_eq!(table.scores().count(), 3);
    }

    #[test]
    fn profile_follows_metric_order() {
        let cohort = vec![
            CohortEntity::new("A", [("m", 1.0), ("n", 4.0)]),
            CohortEntity::new("B", [("m", 3.0), ("n", 2.0)]),
        ];
        let table = normalize(&cohort, &["n", "m"]).unwrap();
        let profile: Vec<(&str, Band)> = table
            .profile("A")
            .iter()
            .map(|s| (s.metric.as_str(), s.band()))
            .collect();
        assert_eq!(
            profile,
            vec![("n", Band::Positive), ("m", Band::Negative)]
        );
    }
}
