//! Pagination module
//!
//! Turns a paginated listing endpoint into either one bounded page or the
//! full result set across all pages.
//!
//! # Overview
//!
//! Listing responses carry the total page count in a response header
//! (`x-total-pages`). [`PageFetcher::fetch_all`] walks pages `1..=total`
//! sequentially and stops after the first page whenever that header is
//! missing or not a number.

mod fetcher;
mod types;

pub use fetcher::{FetchMode, PageFetcher};
pub use types::{parse_total_pages, PaginationConfig, PaginationState, StopResult};
