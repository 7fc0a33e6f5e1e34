//! Built-in comparison cohort: five elite midfielders at Euro 2024, with
//! per-90 figures unless the metric name says otherwise.

use crate::data::model::{AttributeValue, CohortEntity};

pub const PASS_ACCURACY: &str = "Pass_Accuracy";
pub const PASSES_90: &str = "Passes_90";
pub const PROGRESSIVE_PASSES_90: &str = "Progressive_Passes_90";
pub const KEY_PASSES_90: &str = "Key_Passes_90";
pub const ASSISTS: &str = "Assists";
pub const BALL_RECOVERIES_90: &str = "Ball_Recoveries_90";
pub const TOUCHES_90: &str = "Touches_90";

/// Metrics compared by default. Assists and touches are carried but left out.
pub const DEFAULT_METRICS: [&str; 5] = [
    PASS_ACCURACY,
    PASSES_90,
    PROGRESSIVE_PASSES_90,
    KEY_PASSES_90,
    BALL_RECOVERIES_90,
];

/// Name column used by cohort files.
pub const NAME_COLUMN: &str = "Player";

// (player, team, matches, [accuracy, passes, progressive, key, assists, recoveries, touches])
const MIDFIELDERS: [(&str, &str, i64, [f64; 7]); 5] = [
    ("Toni Kroos", "Germany", 5, [94.2, 89.4, 8.2, 2.8, 3.0, 6.8, 98.5]),
    ("Rodri", "Spain", 5, [93.8, 95.2, 7.9, 1.9, 2.0, 8.2, 102.3]),
    ("Jude Bellingham", "England", 5, [88.3, 62.3, 5.4, 3.1, 2.0, 7.1, 72.8]),
    ("Kevin De Bruyne", "Belgium", 3, [90.8, 84.3, 8.1, 3.3, 2.0, 6.9, 94.7]),
    ("Nicolò Barella", "Italy", 4, [88.9, 68.5, 6.5, 2.1, 1.0, 7.4, 82.1]),
];

const METRIC_ORDER: [&str; 7] = [
    PASS_ACCURACY,
    PASSES_90,
    PROGRESSIVE_PASSES_90,
    KEY_PASSES_90,
    ASSISTS,
    BALL_RECOVERIES_90,
    TOUCHES_90,
];

pub fn euro_2024_midfielders() -> Vec<CohortEntity> {
    MIDFIELDERS
        .iter()
        .map(|(name, team, matches, values)| {
            CohortEntity::new(*name, METRIC_ORDER.into_iter().zip(values.iter().copied()))
                .with_attribute("Team", AttributeValue::String((*team).to_string()))
                .with_attribute("Matches", AttributeValue::Integer(*matches))
        })
        .collect()
}
