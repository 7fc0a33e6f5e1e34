use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::analysis::stats::ZeroVariancePolicy;
use crate::data::filter::EventFilter;
use crate::data::model::PitchBounds;
use crate::reference::{DEFAULT_METRICS, NAME_COLUMN};

// ---------------------------------------------------------------------------
// Host configuration
// ---------------------------------------------------------------------------

/// Plain values the host passes into the pipelines.
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```json
/// { "events": "events_3930158.json", "player": "Rodri", "zero_variance": "zero" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Match event table.
    pub events: Option<PathBuf>,
    pub player: String,
    pub action_type: String,
    pub pitch: PitchBounds,
    /// Cohort file; the built-in cohort when absent.
    pub cohort: Option<PathBuf>,
    pub name_column: String,
    pub metrics: Vec<String>,
    pub zero_variance: ZeroVariancePolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            events: None,
            player: "Toni Kroos".to_string(),
            action_type: "Pass".to_string(),
            pitch: PitchBounds::default(),
            cohort: None,
            name_column: NAME_COLUMN.to_string(),
            metrics: DEFAULT_METRICS.iter().map(|m| m.to_string()).collect(),
            zero_variance: ZeroVariancePolicy::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn event_filter(&self) -> EventFilter {
        EventFilter::new(self.player.clone(), self.action_type.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"player": "Rodri", "zero_variance": "zero", "pitch": {{"length": 120, "width": 80}}}}"#
        )
        .unwrap();

        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.player, "Rodri");
        assert_eq!(config.action_type, "Pass");
        assert_eq!(config.zero_variance, ZeroVariancePolicy::Zero);
        assert_eq!(config.pitch.width, 80.0);
        assert_eq!(config.metrics.len(), DEFAULT_METRICS.len());
        assert_eq!(config.event_filter(), EventFilter::new("Rodri", "Pass"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"plaeyr": "Rodri"}}"#).unwrap();
        assert!(AnalysisConfig::from_file(file.path()).is_err());
    }
}
