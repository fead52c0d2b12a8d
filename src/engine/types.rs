//! Engine types
//!
//! Output records, request plans and configuration for the action engine.

use crate::pagination::FetchMode;
use crate::resources::Endpoint;
use crate::types::{FetchQuery, JsonValue};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Index of the input item an output record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    /// Input item index
    pub item: usize,
}

/// One emitted record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    /// The object as returned by the API (or an error payload)
    pub json: JsonValue,
    /// Originating input item
    pub paired_item: PairedItem,
}

impl OutputRecord {
    /// Wrap an API object
    pub fn new(json: JsonValue, item: usize) -> Self {
        Self {
            json,
            paired_item: PairedItem { item },
        }
    }

    /// Error record for a failed input item
    pub fn error(message: impl Into<String>, item: usize) -> Self {
        Self::new(json!({ "error": message.into() }), item)
    }

    /// Check if this is an error record
    pub fn is_error(&self) -> bool {
        self.json
            .as_object()
            .is_some_and(|o| o.len() == 1 && o.get("error").is_some_and(JsonValue::is_string))
    }
}

/// What to request for one input item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPlan {
    /// Target endpoint
    pub endpoint: Endpoint,
    /// Query parameters other than pagination
    pub query: FetchQuery,
    /// How much to fetch
    pub mode: FetchMode,
}

/// Configuration for an execution batch
#[derive(Debug, Clone, Default)]
pub struct ExecuteConfig {
    /// Turn per-item failures into error records instead of aborting
    pub continue_on_fail: bool,
}

impl ExecuteConfig {
    /// Create a new config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set continue-on-fail mode
    #[must_use]
    pub fn with_continue_on_fail(mut self, continue_on_fail: bool) -> Self {
        self.continue_on_fail = continue_on_fail;
        self
    }
}

/// Statistics from an execution batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteStats {
    /// Input items processed
    pub items_processed: usize,
    /// Records emitted, error records included
    pub records_emitted: usize,
    /// Input items that failed
    pub errors: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExecuteStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a processed item
    pub fn add_item(&mut self) {
        self.items_processed += 1;
    }

    /// Add emitted records
    pub fn add_records(&mut self, count: usize) {
        self.records_emitted += count;
    }

    /// Count a failed item
    pub fn add_error(&mut self) {
        self.errors += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
