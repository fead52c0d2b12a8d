//! Execution engine module
//!
//! Runs a `get` / `getAll` action once per input item.
//!
//! # Overview
//!
//! The engine module provides:
//! - `ActionEngine` - Resolves parameters, plans requests and collects records
//! - `ExecuteConfig` - Configuration for an execution batch
//! - `OutputRecord` - Emitted records paired with their input item

mod types;

pub use types::{ExecuteConfig, ExecuteStats, OutputRecord, PairedItem, RequestPlan};

use crate::config::MAX_PAGE_SIZE;
use crate::error::{Error, Result};
use crate::pagination::{FetchMode, PageFetcher};
use crate::params::ParameterSource;
use crate::resources::{Operation, Resource};
use crate::types::{FetchQuery, Item};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default `limit` when `returnAll` is off
pub const DEFAULT_LIMIT: u32 = 50;

/// Build the request for one input item
pub fn plan_request(
    resource: Resource,
    operation: Operation,
    params: &dyn ParameterSource,
    item_index: usize,
) -> Result<RequestPlan> {
    let expand = params.get_str_or("expand", item_index, "")?;
    let query = FetchQuery::new().expand(&expand);

    match operation {
        Operation::Get => {
            let id_param = if resource == Resource::Organization {
                "organizationId"
            } else {
                "resourceId"
            };
            let id = params.get_str(id_param, item_index)?;
            Ok(RequestPlan {
                endpoint: resource.get_endpoint(&id)?,
                query,
                mode: FetchMode::One,
            })
        }
        Operation::GetAll => {
            let organization_id = if resource.is_org_scoped() {
                Some(params.get_str("organizationId", item_index)?)
            } else {
                None
            };
            let endpoint = resource.list_endpoint(organization_id.as_deref())?;

            let return_all = params.get_bool_or("returnAll", item_index, false)?;
            let mode = if return_all {
                FetchMode::All
            } else {
                let limit = params.get_u32_or("limit", item_index, DEFAULT_LIMIT)?;
                if !(1..=MAX_PAGE_SIZE).contains(&limit) {
                    return Err(Error::invalid_parameter(
                        "limit",
                        format!("must be between 1 and {MAX_PAGE_SIZE}, got {limit}"),
                    ));
                }
                FetchMode::Limit(limit)
            };

            Ok(RequestPlan {
                endpoint,
                query,
                mode,
            })
        }
    }
}

/// Executes actions against the HCB API
pub struct ActionEngine {
    /// Page fetcher
    fetcher: PageFetcher,
    /// Execute configuration
    config: ExecuteConfig,
    /// Statistics
    stats: ExecuteStats,
}

impl ActionEngine {
    /// Create a new engine
    pub fn new(fetcher: PageFetcher) -> Self {
        Self {
            fetcher,
            config: ExecuteConfig::default(),
            stats: ExecuteStats::default(),
        }
    }

    /// Set execute configuration
    #[must_use]
    pub fn with_config(mut self, config: ExecuteConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the page fetcher
    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Get statistics
    pub fn stats(&self) -> &ExecuteStats {
        &self.stats
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = ExecuteStats::default();
    }

    /// Run the configured action for items `0..item_count`.
    ///
    /// `resource` and `operation` are read once from item 0. Records are
    /// returned in input order, then in API order within each item.
    pub async fn execute(
        &mut self,
        params: &dyn ParameterSource,
        item_count: usize,
    ) -> Result<Vec<OutputRecord>> {
        let start = Instant::now();

        let resource: Resource = params.get_str("resource", 0)?.parse()?;
        let operation: Operation = params.get_str("operation", 0)?.parse()?;

        info!("Executing {resource}.{operation} for {item_count} items");

        let mut records = Vec::new();
        for item_index in 0..item_count {
            self.stats.add_item();

            match self
                .execute_item(resource, operation, params, item_index)
                .await
            {
                Ok(items) => {
                    debug!("Item {item_index}: {} records", items.len());
                    self.stats.add_records(items.len());
                    records.extend(
                        items
                            .into_iter()
                            .map(|json| OutputRecord::new(json, item_index)),
                    );
                }
                Err(e) if self.config.continue_on_fail => {
                    warn!("Item {item_index} failed, continuing: {e}");
                    self.stats.add_error();
                    self.stats.add_records(1);
                    records.push(OutputRecord::error(e.to_string(), item_index));
                }
                Err(e) => {
                    self.stats.add_error();
                    return Err(e);
                }
            }
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);

        info!(
            "Completed {resource}.{operation}: {} records, {} errors in {}ms",
            self.stats.records_emitted, self.stats.errors, self.stats.duration_ms
        );

        Ok(records)
    }

    async fn execute_item(
        &self,
        resource: Resource,
        operation: Operation,
        params: &dyn ParameterSource,
        item_index: usize,
    ) -> Result<Vec<Item>> {
        let plan = plan_request(resource, operation, params, item_index)?;
        debug!("Item {item_index}: {:?} {}", plan.mode, plan.endpoint);
        self.fetcher
            .fetch(&plan.endpoint, &plan.query, plan.mode)
            .await
    }
}

impl std::fmt::Debug for ActionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionEngine")
            .field("fetcher", &self.fetcher)
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish()
    }
}
