//! Common types used throughout the HCB connector
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single record returned by the remote API, passed through untouched
pub type Item = JsonValue;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method; the transparency API is read-only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::GET => f.write_str("GET"),
        }
    }
}

// ============================================================================
// Fetch Query
// ============================================================================

/// Query parameter name for page size
pub const PER_PAGE_PARAM: &str = "per_page";

/// Query parameter name for the 1-based page number
pub const PAGE_PARAM: &str = "page";

/// Query parameter name for inlined related objects
pub const EXPAND_PARAM: &str = "expand";

/// Query parameters sent with a listing or get request
///
/// Kept ordered so that request URLs are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchQuery {
    params: BTreeMap<String, String>,
}

impl FetchQuery {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Set an arbitrary parameter in place
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.params.insert(key.into(), value.to_string());
    }

    /// Set `per_page`
    #[must_use]
    pub fn per_page(self, size: u32) -> Self {
        self.param(PER_PAGE_PARAM, size)
    }

    /// Set `page`
    #[must_use]
    pub fn page(self, page: u32) -> Self {
        self.param(PAGE_PARAM, page)
    }

    /// Set `expand`, skipping empty values
    #[must_use]
    pub fn expand(mut self, expand: &str) -> Self {
        let expand = expand.trim();
        if !expand.is_empty() {
            self.set(EXPAND_PARAM, expand);
        }
        self
    }

    /// Look up a parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Check if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Normalize a response body into a sequence of items
///
/// Arrays are returned as-is; any other value becomes a single-element sequence.
pub fn into_items(body: JsonValue) -> Vec<Item> {
    match body {
        JsonValue::Array(items) => items,
        other => vec![other],
    }
}
