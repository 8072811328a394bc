//! Entity history — audit records of observable state changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{StateMap, StateValue};
use crate::time::Timestamp;

/// One key's transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub from: StateValue,
    pub to: StateValue,
}

/// Changes applied by a single successful update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub recorded_at: Timestamp,
    pub changes: BTreeMap<String, StateChange>,
}

impl HistoryRecord {
    /// Build a record from the state before an update and the patch applied.
    ///
    /// Returns `None` when nothing observable changed.
    #[must_use]
    pub fn from_patch(before: &StateMap, patch: &StateMap, recorded_at: Timestamp) -> Option<Self> {
        let changes = diff_patch(before, patch);
        if changes.is_empty() {
            return None;
        }
        Some(Self {
            recorded_at,
            changes,
        })
    }

    /// Look up the transition of a single key.
    #[must_use]
    pub fn change(&self, key: &str) -> Option<&StateChange> {
        self.changes.get(key)
    }
}

/// Keys present in both `before` and `patch` whose values differ.
#[must_use]
pub fn diff_patch(before: &StateMap, patch: &StateMap) -> BTreeMap<String, StateChange> {
    patch
        .iter()
        .filter_map(|(key, to)| {
            let from = before.get(key)?;
            (from != to).then(|| {
                (
                    key.clone(),
                    StateChange {
                        from: from.clone(),
                        to: to.clone(),
                    },
                )
            })
        })
        .collect()
}
