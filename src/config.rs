//! Connector configuration
//!
//! Settings are loaded from an optional YAML file; every field has a
//! default so an empty file (or no file at all) yields a working setup
//! pointed at the public HCB API.
//!
//! ```yaml
//! base_url: https://hcb.hackclub.com
//! http:
//!   timeout_secs: 30
//! pagination:
//!   page_size: 100
//! trigger:
//!   tie_break: legacy
//! state_file: .hcb/state.json
//! ```

use crate::error::{Error, Result};
use crate::trigger::TieBreak;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://hcb.hackclub.com";

/// Largest page size the API accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Header carrying the total number of listing pages
pub const TOTAL_PAGES_HEADER: &str = "x-total-pages";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete connector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Base URL for API requests
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Listing pagination settings
    #[serde(default)]
    pub pagination: PaginationSettings,

    /// Polling trigger settings
    #[serde(default)]
    pub trigger: TriggerSettings,

    /// Where poll cursors are persisted between runs
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            http: HttpConfig::default(),
            pagination: PaginationSettings::default(),
            trigger: TriggerSettings::default(),
            state_file: None,
        }
    }
}

impl ConnectorConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that all values are usable
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("Invalid base_url '{}': {e}", self.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base_url must use http or https, got '{}'",
                base.scheme()
            )));
        }

        if self.http.timeout_secs == 0 {
            return Err(Error::config("http.timeout_secs must be at least 1"));
        }

        validate_page_size("pagination.page_size", self.pagination.page_size)?;
        validate_page_size("trigger.page_size", self.trigger.page_size)?;

        if self.pagination.total_pages_header.trim().is_empty() {
            return Err(Error::config("pagination.total_pages_header cannot be empty"));
        }
        if self.trigger.date_field.trim().is_empty() {
            return Err(Error::config("trigger.date_field cannot be empty"));
        }
        if self.trigger.id_field.trim().is_empty() {
            return Err(Error::config("trigger.id_field cannot be empty"));
        }

        Ok(())
    }
}

fn validate_page_size(field: &str, size: u32) -> Result<()> {
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(Error::config(format!(
            "{field} must be between 1 and {MAX_PAGE_SIZE}, got {size}"
        )));
    }
    Ok(())
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Headers added to every request
    #[serde(default = "default_headers")]
    pub headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            headers: default_headers(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("hcb-connector/{}", env!("CARGO_PKG_VERSION"))
}

fn default_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Accept".to_string(), "application/json".to_string());
    headers
}

// ============================================================================
// Pagination Config
// ============================================================================

/// Settings for multi-page listing fetches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSettings {
    /// `per_page` used when fetching every page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Response header holding the total page count
    #[serde(default = "default_total_pages_header")]
    pub total_pages_header: String,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            total_pages_header: default_total_pages_header(),
        }
    }
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_total_pages_header() -> String {
    TOTAL_PAGES_HEADER.to_string()
}

// ============================================================================
// Trigger Config
// ============================================================================

/// Settings for the polling trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSettings {
    /// `per_page` for the single poll request
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Item field holding the item date
    #[serde(default = "default_date_field")]
    pub date_field: String,

    /// Item field holding the item identifier
    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// How items sharing the cursor date are treated
    #[serde(default)]
    pub tie_break: TieBreak,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            date_field: default_date_field(),
            id_field: default_id_field(),
            tie_break: TieBreak::default(),
        }
    }
}

fn default_date_field() -> String {
    "date".to_string()
}

fn default_id_field() -> String {
    "id".to_string()
}
