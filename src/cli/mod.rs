//! CLI module
//!
//! Command-line interface for the HCB connector.
//!
//! # Commands
//!
//! - `resources` - List supported resources
//! - `get` - Fetch one object
//! - `list` - List objects, one page or all pages
//! - `execute` - Run an action over per-item parameters
//! - `poll` - Emit new transactions or donations

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
