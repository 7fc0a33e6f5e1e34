use serde::{Deserialize, Serialize};

/// What to do with a metric whose cohort values are all identical.
///
/// The z-score `(v - mean) / std_dev` is undefined when `std_dev == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroVariancePolicy {
    /// Report the metric as degenerate. Other metrics are unaffected.
    #[default]
    Reject,
    /// Every entity scores 0 on the metric.
    Zero,
}

/// Mean and sample standard deviation of one metric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (`n - 1` denominator).
    pub std_dev: f64,
}

impl MetricStats {
    /// Two-pass computation: the mean first, then the squared deviations
    /// from it.
    ///
    /// Fails for fewer than two values, where the sample standard deviation
    /// is undefined, and for non-finite input or a spread that does not fit
    /// in an `f64`.
    ///
    /// ```
    /// # use pitchlens::analysis::stats::MetricStats;
    /// let stats = MetricStats::new(&[10.0, 20.0, 30.0]).unwrap();
    /// assert_eq!(stats.mean, 20.0);
    /// assert_eq!(stats.std_dev, 10.0);
    /// ```
    pub fn new(values: &[f64]) -> Result<Self, StandardizeError> {
        let count = values.len();
        if count < 2 {
            return Err(StandardizeError::TooFewValues(count));
        }
        if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(StandardizeError::NonFinite(bad));
        }

        // Sums run on values divided by a power of two that brings them
        // into [-2, 2], so squared deviations cannot overflow. A power of two
        // keeps the arithmetic bit-identical to the unscaled one.
        let scale = power_of_two_scale(values);
        let n = count as f64;
        let mean = values.iter().map(|v| v / scale).sum::<f64>() / n;
        // Identical values must give an exact zero, which rounding in the
        // mean would otherwise turn into a tiny positive spread.
        let variance = if values.windows(2).all(|w| w[0] == w[1]) {
            0.0
        } else {
            values
                .iter()
                .map(|v| (v / scale - mean).powi(2))
                .sum::<f64>()
                / (n - 1.0)
        };

        let std_dev = variance.sqrt() * scale;
        if !std_dev.is_finite() {
            return Err(StandardizeError::NonFinite(std_dev));
        }
        Ok(Self {
            count,
            mean: mean * scale,
            std_dev,
        })
    }

    pub fn is_degenerate(&self) -> bool {
        self.std_dev == 0.0
    }

    /// Standardized score of `value`; `None` when the spread is zero.
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }
        let deviation = value - self.mean;
        Some(if deviation.is_finite() {
            deviation / self.std_dev
        } else {
            value / self.std_dev - self.mean / self.std_dev
        })
    }
}

fn power_of_two_scale(values: &[f64]) -> f64 {
    let max_abs = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if max_abs <= 1.0 {
        return 1.0;
    }
    let exponent = (max_abs.log2().ceil() as i32).min(f64::MAX_EXP - 1);
    2.0_f64.powi(exponent)
}

/// Why a column could not be standardized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StandardizeError {
    TooFewValues(usize),
    ZeroVariance(f64),
    /// A NaN or infinite input, or a standard deviation beyond `f64::MAX`.
    NonFinite(f64),
}

/// Standardize a column of values independently of any table type.
pub fn standardize(
    values: &[f64],
    policy: ZeroVariancePolicy,
) -> Result<(MetricStats, Vec<f64>), StandardizeError> {
    let stats = MetricStats::new(values)?;
    if stats.is_degenerate() {
        return match policy {
            ZeroVariancePolicy::Reject => Err(StandardizeError::ZeroVariance(stats.mean)),
            ZeroVariancePolicy::Zero => Ok((stats, vec![0.0; values.len()])),
        };
    }
    let scores = values.iter().filter_map(|v| stats.z_score(*v)).collect();
    Ok((stats, scores))
}
