//! Page fetcher
//!
//! Issues listing requests through a [`Transport`] and aggregates pages in
//! order. Transport failures are returned to the caller untouched; no retry
//! and no partial result.

use super::types::{PaginationConfig, PaginationState, StopResult};
use crate::error::Result;
use crate::http::Transport;
use crate::resources::Endpoint;
use crate::types::{into_items, FetchQuery, Item, JsonValue, Method};
use std::sync::Arc;
use tracing::{debug, info};

/// How much of a listing to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// A single request with the query as given (used for get-by-id)
    One,
    /// Every page
    All,
    /// One request with `per_page = n`, truncated to `n` items
    Limit(u32),
}

impl FetchMode {
    /// Pick between "return all" and "return up to `limit`"
    pub fn listing(return_all: bool, limit: u32) -> Self {
        if return_all {
            Self::All
        } else {
            Self::Limit(limit)
        }
    }
}

/// Fetches one page or every page of a listing endpoint
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn Transport>,
    config: PaginationConfig,
}

impl PageFetcher {
    /// Create a new page fetcher
    pub fn new(transport: Arc<dyn Transport>, config: PaginationConfig) -> Self {
        Self { transport, config }
    }

    /// Get the pagination config
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Fetch according to `mode`
    pub async fn fetch(
        &self,
        endpoint: &Endpoint,
        query: &FetchQuery,
        mode: FetchMode,
    ) -> Result<Vec<Item>> {
        match mode {
            FetchMode::One => self.fetch_one(endpoint, query).await,
            FetchMode::All => self.fetch_all(endpoint, query).await,
            FetchMode::Limit(limit) => self.fetch_limited(endpoint, query, limit).await,
        }
    }

    /// Issue exactly one request; a non-array body becomes a single item
    pub async fn fetch_one(&self, endpoint: &Endpoint, query: &FetchQuery) -> Result<Vec<Item>> {
        let url = endpoint.url(&self.config.base_url)?;
        let body = self
            .transport
            .request(Method::GET, url.as_str(), query)
            .await?;
        Ok(into_items(body))
    }

    /// One request with `per_page = limit`, keeping at most `limit` items
    pub async fn fetch_limited(
        &self,
        endpoint: &Endpoint,
        query: &FetchQuery,
        limit: u32,
    ) -> Result<Vec<Item>> {
        let query = query.clone().per_page(limit);
        let mut items = self.fetch_one(endpoint, &query).await?;
        if items.len() > limit as usize {
            debug!(
                "{} returned {} items for per_page={limit}, truncating",
                endpoint,
                items.len()
            );
            items.truncate(limit as usize);
        }
        Ok(items)
    }

    /// Walk every page in ascending order and concatenate the items
    pub async fn fetch_all(&self, endpoint: &Endpoint, query: &FetchQuery) -> Result<Vec<Item>> {
        let url = endpoint.url(&self.config.base_url)?;
        let mut state = PaginationState::new();
        let mut all_items = Vec::new();

        loop {
            let page_query = query
                .clone()
                .per_page(self.config.page_size)
                .page(state.page);

            let response = self
                .transport
                .request_full(Method::GET, url.as_str(), &page_query)
                .await?;

            let status = state.process_response(&response, &self.config.total_pages_header);

            let items = match response.body {
                JsonValue::Array(items) => items,
                _ => Vec::new(),
            };
            state.add_fetched(items.len() as u64);
            debug!(
                "{} page {}/{}: {} items",
                endpoint,
                state.page,
                state
                    .total_pages
                    .map_or_else(|| "?".to_string(), |t| t.to_string()),
                items.len()
            );
            all_items.extend(items);

            match status {
                StopResult::Continue => state.next_page(),
                StopResult::Stop => break,
            }
        }

        info!(
            "Fetched {} items from {} in {} pages",
            state.total_fetched, endpoint, state.page
        );

        Ok(all_items)
    }
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
