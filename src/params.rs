//! Operation parameters
//!
//! The host resolves operation parameters per input item; this module
//! abstracts that as [`ParameterSource`] and ships a JSON-backed
//! implementation used by the CLI.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resolves a named parameter for a given input item
pub trait ParameterSource: Send + Sync {
    /// Raw parameter value, `None` when unset
    fn get(&self, name: &str, item_index: usize) -> Option<JsonValue>;

    /// Required string parameter
    fn get_str(&self, name: &str, item_index: usize) -> Result<String> {
        match self.get(name, item_index) {
            None | Some(JsonValue::Null) => Err(Error::missing_parameter(name)),
            Some(value) => value_to_string(name, value),
        }
    }

    /// Optional string parameter with a default
    fn get_str_or(&self, name: &str, item_index: usize, default: &str) -> Result<String> {
        match self.get(name, item_index) {
            None | Some(JsonValue::Null) => Ok(default.to_string()),
            Some(value) => value_to_string(name, value),
        }
    }

    /// Optional boolean parameter with a default
    fn get_bool_or(&self, name: &str, item_index: usize, default: bool) -> Result<bool> {
        match self.get(name, item_index) {
            None | Some(JsonValue::Null) => Ok(default),
            Some(JsonValue::Bool(b)) => Ok(b),
            Some(JsonValue::String(s)) => match s.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Error::invalid_parameter(name, format!("expected a boolean, got '{s}'"))),
            },
            Some(other) => Err(Error::invalid_parameter(
                name,
                format!("expected a boolean, got {other}"),
            )),
        }
    }

    /// Optional unsigned integer parameter with a default
    fn get_u32_or(&self, name: &str, item_index: usize, default: u32) -> Result<u32> {
        let invalid = |v: &dyn std::fmt::Display| {
            Error::invalid_parameter(name, format!("expected a non-negative integer, got {v}"))
        };

        match self.get(name, item_index) {
            None | Some(JsonValue::Null) => Ok(default),
            Some(JsonValue::Number(n)) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| invalid(&n)),
            Some(JsonValue::String(s)) => s.trim().parse().map_err(|_| invalid(&s)),
            Some(other) => Err(invalid(&other)),
        }
    }
}

fn value_to_string(name: &str, value: JsonValue) -> Result<String> {
    match value {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        other => Err(Error::invalid_parameter(
            name,
            format!("expected a string, got {other}"),
        )),
    }
}

/// Node-level parameters plus optional per-item overrides
///
/// ```json
/// {
///   "parameters": { "resource": "transaction", "operation": "getAll", "returnAll": true },
///   "items": [ { "organizationId": "hq" }, { "organizationId": "hackclub" } ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonParameters {
    /// Values shared by every item
    #[serde(default)]
    pub parameters: JsonObject,

    /// Per-item values, taking precedence over `parameters`
    #[serde(default)]
    pub items: Vec<JsonObject>,
}

impl JsonParameters {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read parameters file {}: {e}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }

    /// Set a node-level parameter
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Append an input item's overrides
    #[must_use]
    pub fn with_item(mut self, item: JsonObject) -> Self {
        self.items.push(item);
        self
    }

    /// Number of input items; a run with no explicit items processes one
    pub fn item_count(&self) -> usize {
        self.items.len().max(1)
    }
}

impl ParameterSource for JsonParameters {
    fn get(&self, name: &str, item_index: usize) -> Option<JsonValue> {
        self.items
            .get(item_index)
            .and_then(|item| item.get(name))
            .or_else(|| self.parameters.get(name))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: JsonValue) -> JsonObject {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_item_overrides_node_parameter() {
        let params = JsonParameters::new()
            .with_param("organizationId", "hq")
            .with_item(item(json!({})))
            .with_item(item(json!({"organizationId": "hackclub"})));

        assert_eq!(params.get_str("organizationId", 0).unwrap(), "hq");
        assert_eq!(params.get_str("organizationId", 1).unwrap(), "hackclub");
        assert_eq!(params.get_str("organizationId", 7).unwrap(), "hq");
        assert_eq!(params.item_count(), 2);
    }

    #[test]
    fn test_missing_parameter() {
        let params = JsonParameters::new().with_param("resourceId", JsonValue::Null);
        let err = params.get_str("resourceId", 0).unwrap_err();
        assert!(matches!(err, Error::MissingParameter { .. }));

        assert_eq!(params.get_str_or("expand", 0, "").unwrap(), "");
    }

    #[test]
    fn test_string_coercion() {
        let params = JsonParameters::new().with_param("resourceId", 42);
        assert_eq!(params.get_str("resourceId", 0).unwrap(), "42");

        let params = JsonParameters::new().with_param("resourceId", json!(["a"]));
        assert!(matches!(
            params.get_str("resourceId", 0),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_bool_parameter() {
        let params = JsonParameters::new()
            .with_param("returnAll", true)
            .with_param("flag", "false")
            .with_param("bad", 3);

        assert!(params.get_bool_or("returnAll", 0, false).unwrap());
        assert!(!params.get_bool_or("flag", 0, true).unwrap());
        assert!(params.get_bool_or("absent", 0, true).unwrap());
        assert!(params.get_bool_or("bad", 0, false).is_err());
    }

    #[test]
    fn test_u32_parameter() {
        let params = JsonParameters::new()
            .with_param("limit", 25)
            .with_param("text", "30")
            .with_param("negative", -1)
            .with_param("fraction", 2.5);

        assert_eq!(params.get_u32_or("limit", 0, 50).unwrap(), 25);
        assert_eq!(params.get_u32_or("text", 0, 50).unwrap(), 30);
        assert_eq!(params.get_u32_or("absent", 0, 50).unwrap(), 50);
        assert!(params.get_u32_or("negative", 0, 50).is_err());
        assert!(params.get_u32_or("fraction", 0, 50).is_err());
    }

    #[test]
    fn test_from_json_str() {
        let params = JsonParameters::from_json_str(
            r#"{"parameters": {"resource": "donation"}, "items": [{"organizationId": "hq"}]}"#,
        )
        .unwrap();

        assert_eq!(params.get_str("resource", 0).unwrap(), "donation");
        assert_eq!(params.get_str("organizationId", 0).unwrap(), "hq");
        assert_eq!(params.item_count(), 1);

        let empty = JsonParameters::from_json_str("{}").unwrap();
        assert_eq!(empty.item_count(), 1);
    }
}
