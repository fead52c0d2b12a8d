//! State management module
//!
//! Persists poll cursors between trigger invocations.
//!
//! # Overview
//!
//! The state module provides:
//! - `PollCursor` - the last-seen marker for one trigger
//! - `TriggerState` - cursors keyed by trigger identity
//! - `StateManager` - in-memory or file-backed persistence

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{PollCursor, TriggerState};
