//! Trigger types
//!
//! Poll modes, outcomes and configuration for the incremental poller.

use crate::config::{ConnectorConfig, DEFAULT_BASE_URL, MAX_PAGE_SIZE};
use crate::error::Result;
use crate::params::ParameterSource;
use crate::resources::{Endpoint, TriggerResource};
use crate::types::Item;
use serde::{Deserialize, Serialize};

/// How the host invoked the poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollMode {
    /// Timer-driven poll; advances the cursor
    #[default]
    Trigger,
    /// Preview / connection test; never touches the cursor
    Manual,
}

/// Result of a poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Items to hand to the downstream workflow
    Emit(Vec<Item>),
    /// Nothing new; the host should not start a run
    Nothing,
}

impl PollOutcome {
    /// Wrap items, mapping an empty set to `Nothing`
    pub fn from_items(items: Vec<Item>) -> Self {
        if items.is_empty() {
            Self::Nothing
        } else {
            Self::Emit(items)
        }
    }

    /// Items to emit (empty for `Nothing`)
    pub fn items(&self) -> &[Item] {
        match self {
            Self::Emit(items) => items,
            Self::Nothing => &[],
        }
    }

    /// Check if there is nothing to emit
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// Take the items, `None` for `Nothing`
    pub fn into_items(self) -> Option<Vec<Item>> {
        match self {
            Self::Emit(items) => Some(items),
            Self::Nothing => None,
        }
    }
}

/// How items sharing the cursor date are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Compare the item id against the stored date string
    #[default]
    Legacy,
    /// Skip items whose id was already emitted at the cursor date
    LastItemId,
}

/// Configuration for an [`IncrementalPoller`](super::IncrementalPoller)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// API host requests are resolved against
    pub base_url: String,
    /// `per_page` for the single poll request
    pub page_size: u32,
    /// Item field holding the date
    pub date_field: String,
    /// Item field holding the identifier
    pub id_field: String,
    /// Same-date handling
    pub tie_break: TieBreak,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            date_field: "date".to_string(),
            id_field: "id".to_string(),
            tie_break: TieBreak::Legacy,
        }
    }
}

impl PollerConfig {
    /// Default configuration pointed at another host
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the tie-break strategy
    #[must_use]
    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}

impl From<&ConnectorConfig> for PollerConfig {
    fn from(config: &ConnectorConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            page_size: config.trigger.page_size,
            date_field: config.trigger.date_field.clone(),
            id_field: config.trigger.id_field.clone(),
            tie_break: config.trigger.tie_break,
        }
    }
}

/// The listing a trigger watches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerTarget {
    /// Watched resource
    pub resource: TriggerResource,
    /// Organization ID or slug
    pub organization_id: String,
    /// Related objects to inline (comma-separated, may be empty)
    pub expand: String,
}

impl TriggerTarget {
    /// Create a target without expansions
    pub fn new(resource: TriggerResource, organization_id: impl Into<String>) -> Self {
        Self {
            resource,
            organization_id: organization_id.into(),
            expand: String::new(),
        }
    }

    /// Set the expand list
    #[must_use]
    pub fn expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = expand.into();
        self
    }

    /// Read `resource`, `organizationId` and `expand` from the host
    pub fn from_params(params: &dyn ParameterSource) -> Result<Self> {
        let resource = params.get_str_or("resource", 0, "transaction")?.parse()?;
        let organization_id = params.get_str("organizationId", 0)?;
        let expand = params.get_str_or("expand", 0, "")?;

        Ok(Self {
            resource,
            organization_id,
            expand,
        })
    }

    /// Key under which this trigger's cursor is persisted
    pub fn key(&self) -> String {
        format!("{}:{}", self.resource, self.organization_id)
    }

    /// Listing endpoint for this target
    pub fn endpoint(&self) -> Result<Endpoint> {
        self.resource
            .resource()
            .list_endpoint(Some(&self.organization_id))
    }
}
