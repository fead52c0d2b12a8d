//! Polling trigger module
//!
//! Turns "fetch the latest page of a listing" into an append-only stream of
//! items not seen by a previous poll.
//!
//! # Overview
//!
//! There is no server-side cursor or webhook, so detection relies on the
//! item date plus identifier:
//! - First scheduled poll emits only the newest item
//! - Later polls emit items dated after the stored cursor
//! - Manual polls preview the newest item and never move the cursor
//!
//! # Same-date items
//!
//! With [`TieBreak::Legacy`] an item whose date equals the cursor is treated
//! as new unless its id equals the cursor's *date* string. That compares an
//! identifier against a date, so in practice the boundary item is emitted
//! again on every poll until a newer item arrives.
//! [`TieBreak::LastItemId`] stores the ids of every emitted item carrying the
//! cursor date and skips those, so several items sharing the newest date are
//! each emitted exactly once.

mod poller;
mod types;

pub use poller::{detect_new_items, parse_item_date, Detection, IncrementalPoller};
pub use types::{PollMode, PollOutcome, PollerConfig, TieBreak, TriggerTarget};
