// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # HCB Connector
//!
//! Read-only client for the HCB (Hack Club Bank) transparency API.
//!
//! ## Features
//!
//! - **Actions**: `get` and `getAll` over fifteen resources, run once per input item
//! - **Pagination**: `per_page` / `page` walking driven by the `x-total-pages` header
//! - **Polling Trigger**: Emits new transactions or donations since the last poll
//! - **Cursor State**: Poll cursors persisted as JSON between runs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hcb_connector::http::HttpClient;
//! use hcb_connector::pagination::{PageFetcher, PaginationConfig};
//! use hcb_connector::resources::Resource;
//! use hcb_connector::types::FetchQuery;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> hcb_connector::Result<()> {
//!     let fetcher = PageFetcher::new(Arc::new(HttpClient::new()?), PaginationConfig::default());
//!
//!     let endpoint = Resource::Transaction.list_endpoint(Some("hq"))?;
//!     let transactions = fetcher.fetch_all(&endpoint, &FetchQuery::new()).await?;
//!     println!("{} transactions", transactions.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────┐   ┌───────────────────────────────┐
//! │          ActionEngine         │   │       IncrementalPoller       │
//! │  params → plan → records      │   │  cursor → latest page → new   │
//! └───────────────┬───────────────┘   └───────────────┬───────────────┘
//!                 │                                   │
//! ┌───────────────┴───────────────┐   ┌───────────────┴───────────────┐
//! │          PageFetcher          │   │         StateManager          │
//! │  one / limited / all pages    │   │  JSON cursors per trigger     │
//! └───────────────┬───────────────┘   └───────────────────────────────┘
//!                 │
//! ┌───────────────┴───────────────┐
//! │     Transport (HttpClient)    │
//! └───────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Connector configuration
pub mod config;

/// Resource table and endpoints
pub mod resources;

/// Per-item operation parameters
pub mod params;

/// HTTP transport
pub mod http;

/// Listing pagination
pub mod pagination;

/// Poll cursor persistence
pub mod state;

/// Polling trigger
pub mod trigger;

/// Action execution engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ConnectorConfig;
pub use engine::{ActionEngine, ExecuteConfig, OutputRecord};
pub use pagination::{FetchMode, PageFetcher};
pub use resources::{Operation, Resource, TriggerResource};
pub use trigger::{IncrementalPoller, PollMode, PollOutcome, TieBreak};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
