//! State types for the polling trigger
//!
//! These types are serialized to JSON and persisted between runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Last-seen marker for one trigger
///
/// Absent on the first poll. `last_item_date` keeps the newest item's date
/// string exactly as the API returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollCursor {
    /// Newest item date seen by a scheduled poll
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_item_date: Option<String>,

    /// Identifiers already emitted at `last_item_date`; only maintained
    /// with `TieBreak::LastItemId`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub last_item_ids: Vec<String>,
}

impl PollCursor {
    /// Create an empty cursor
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cursor at a given date
    pub fn at(date: impl Into<String>) -> Self {
        Self {
            last_item_date: Some(date.into()),
            last_item_ids: Vec::new(),
        }
    }

    /// Record one more identifier seen at the cursor date
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.last_item_ids.contains(&id) {
            self.last_item_ids.push(id);
        }
        self
    }

    /// True when `id` was already emitted at the cursor date
    pub fn has_seen(&self, id: &str) -> bool {
        self.last_item_ids.iter().any(|seen| seen == id)
    }

    /// True before the first successful scheduled poll
    pub fn is_empty(&self) -> bool {
        self.last_item_date.is_none()
    }
}

/// Cursors for every configured trigger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerState {
    /// Cursor per trigger key (`{resource}:{organization}`)
    #[serde(default)]
    pub triggers: HashMap<String, PollCursor>,
}

impl TriggerState {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cursor for a trigger
    pub fn get_cursor(&self, key: &str) -> Option<&PollCursor> {
        self.triggers.get(key)
    }

    /// Replace the cursor for a trigger
    pub fn set_cursor(&mut self, key: &str, cursor: PollCursor) {
        self.triggers.insert(key.to_string(), cursor);
    }
}
