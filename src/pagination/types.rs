//! Pagination types
//!
//! Configuration, per-fetch state and the total-pages stop rule.

use crate::config::{ConnectorConfig, DEFAULT_BASE_URL, MAX_PAGE_SIZE, TOTAL_PAGES_HEADER};
use crate::http::TransportResponse;

/// Configuration for a [`PageFetcher`](super::PageFetcher)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// API host requests are resolved against
    pub base_url: String,
    /// `per_page` used when fetching every page
    pub page_size: u32,
    /// Header holding the total page count
    pub total_pages_header: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            total_pages_header: TOTAL_PAGES_HEADER.to_string(),
        }
    }
}

impl PaginationConfig {
    /// Default configuration pointed at another host
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl From<&ConnectorConfig> for PaginationConfig {
    fn from(config: &ConnectorConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            page_size: config.pagination.page_size,
            total_pages_header: config.pagination.total_pages_header.clone(),
        }
    }
}

/// Result of checking the stop rule after a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopResult {
    /// Request the next page
    Continue,
    /// Pagination is complete
    Stop,
}

/// Tracks progress through a multi-page fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// Current page number (1-based)
    pub page: u32,
    /// Total page count reported by the last response
    pub total_pages: Option<i64>,
    /// Items fetched so far
    pub total_fetched: u64,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: None,
            total_fetched: 0,
        }
    }
}

impl PaginationState {
    /// Create state positioned on page 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment page number
    pub fn next_page(&mut self) {
        self.page += 1;
    }

    /// Add to total fetched
    pub fn add_fetched(&mut self, count: u64) {
        self.total_fetched += count;
    }

    /// Record the page count from a response and decide whether to go on.
    ///
    /// Stops when the header is absent or not an integer, or when the
    /// current page is already the last one.
    pub fn process_response(&mut self, response: &TransportResponse, header: &str) -> StopResult {
        self.total_pages = response.header(header).and_then(parse_total_pages);

        match self.total_pages {
            Some(total) if i64::from(self.page) < total => StopResult::Continue,
            _ => StopResult::Stop,
        }
    }
}

/// Parse a page count the way lenient integer parsers do: leading
/// whitespace and an optional sign, then as many digits as are present.
///
/// `"3"`, `" 3 "` and `"3 pages"` all give 3; `""`, `"abc"` and `"-"` give
/// `None`.
pub fn parse_total_pages(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let magnitude = rest[..digits_end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
