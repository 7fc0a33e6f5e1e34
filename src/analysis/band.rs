use std::fmt;

use serde::Serialize;

/// Qualitative reading of a z-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    StrongNegative,
    Negative,
    Neutral,
    Positive,
    StrongPositive,
}

impl Band {
    /// Band for `z`. `|z| <= 0.5` is neutral; the outer edges at `±1.5`
    /// belong to the inner bands. NaN reads as neutral.
    pub fn from_z(z: f64) -> Self {
        if z > 1.5 {
            Band::StrongPositive
        } else if z > 0.5 {
            Band::Positive
        } else if z < -1.5 {
            Band::StrongNegative
        } else if z < -0.5 {
            Band::Negative
        } else {
            Band::Neutral
        }
    }

    /// Compact marker for summaries.
    pub fn symbol(self) -> &'static str {
        match self {
            Band::StrongPositive => "++",
            Band::Positive => "+",
            Band::Neutral => "≈",
            Band::Negative => "-",
            Band::StrongNegative => "--",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Shorthand for [`Band::from_z`].
pub fn band(z: f64) -> Band {
    Band::from_z(z)
}
