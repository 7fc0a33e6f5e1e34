use serde::{Deserialize, Serialize};

use super::model::{EventRecord, EventTable};

// ---------------------------------------------------------------------------
// Filter predicate: which player's actions of which type are selected
// ---------------------------------------------------------------------------

/// Exact-match selection of one player's actions of one type.
///
/// Both strings are compared verbatim against the provider values: no case
/// folding, no trimming, no accent normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub player: String,
    pub action_type: String,
}

impl EventFilter {
    pub fn new(player: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            action_type: action_type.into(),
        }
    }

    /// A record without a player never matches.
    pub fn matches(&self, event: &EventRecord) -> bool {
        event.player_name.as_deref() == Some(self.player.as_str())
            && event.type_name == self.action_type
    }
}

/// Return indices of events that pass the filter, in table order.
pub fn filtered_indices(table: &EventTable, filter: &EventFilter) -> Vec<usize> {
    table
        .events
        .iter()
        .enumerate()
        .filter(|(_, ev)| filter.matches(ev))
        .map(|(i, _)| i)
        .collect()
}
