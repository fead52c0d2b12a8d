//! Incremental poller
//!
//! One poll is one listing request (`per_page = 100`, no deeper pages). The
//! cursor is only written after that request succeeded.

use super::types::{PollMode, PollOutcome, PollerConfig, TieBreak, TriggerTarget};
use crate::error::Result;
use crate::http::Transport;
use crate::state::{PollCursor, StateManager};
use crate::types::{FetchQuery, Item, JsonValue, Method};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Parse an item date into epoch milliseconds.
///
/// Accepts RFC 3339 date-times, naive `YYYY-MM-DDTHH:MM:SS[.fff]` and plain
/// `YYYY-MM-DD` dates (midnight). Naive values are read as UTC, never as the
/// local time zone of the polling machine, so comparisons do not depend on
/// where the trigger runs.
pub fn parse_item_date(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// New items and the cursor to store after a scheduled poll
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Items considered new, in fetch order
    pub new_items: Vec<Item>,
    /// Replacement cursor, `None` when no fetched item had a usable date
    pub next_cursor: Option<PollCursor>,
}

/// String form of an identifier field (strings and numbers)
fn id_string(item: &Item, field: &str) -> Option<String> {
    match item.get(field)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Date string and parsed millis of an item
fn item_date<'a>(item: &'a Item, field: &str) -> Option<(&'a str, i64)> {
    let raw = item.get(field)?.as_str()?;
    parse_item_date(raw).map(|millis| (raw, millis))
}

/// Decide which fetched items are new relative to `cursor`.
///
/// `items` is the latest listing, newest first. Items without a parseable
/// date never count as new once a cursor exists and never move the cursor.
pub fn detect_new_items(items: &[Item], cursor: &PollCursor, config: &PollerConfig) -> Detection {
    // Newest dated item; the first one wins on equal dates.
    let mut newest: Option<(&str, i64)> = None;
    for item in items {
        if let Some((raw, millis)) = item_date(item, &config.date_field) {
            if newest.map_or(true, |(_, max)| millis > max) {
                newest = Some((raw, millis));
            }
        }
    }

    let new_items: Vec<Item> = match cursor.last_item_date.as_deref() {
        None => items.iter().take(1).cloned().collect(),
        Some(last_date) => match parse_item_date(last_date) {
            None => {
                warn!("Stored cursor date '{last_date}' is not a date; treating nothing as new");
                Vec::new()
            }
            Some(last_millis) => items
                .iter()
                .filter(|item| {
                    let Some((_, millis)) = item_date(item, &config.date_field) else {
                        return false;
                    };
                    if millis > last_millis {
                        return true;
                    }
                    if millis < last_millis {
                        return false;
                    }
                    match config.tie_break {
                        TieBreak::Legacy => {
                            item.get(&config.id_field).and_then(JsonValue::as_str)
                                != Some(last_date)
                        }
                        TieBreak::LastItemId => !id_string(item, &config.id_field)
                            .is_some_and(|id| cursor.has_seen(&id)),
                    }
                })
                .cloned()
                .collect(),
        },
    };

    let next_cursor = newest.map(|(raw, max)| match config.tie_break {
        TieBreak::Legacy => PollCursor {
            last_item_date: Some(raw.to_string()),
            last_item_ids: cursor.last_item_ids.clone(),
        },
        TieBreak::LastItemId => {
            // Ids already emitted at this instant stay excluded
            let same_instant = cursor.last_item_date.as_deref().and_then(parse_item_date)
                == Some(max);
            let seed = if same_instant {
                cursor.last_item_ids.clone()
            } else {
                Vec::new()
            };
            let start = PollCursor {
                last_item_date: Some(raw.to_string()),
                last_item_ids: seed,
            };
            // The first poll only marks what it emitted
            let seen = if cursor.is_empty() { &new_items[..] } else { items };
            seen.iter()
                .filter(|item| item_date(item, &config.date_field).is_some_and(|(_, m)| m == max))
                .filter_map(|item| id_string(item, &config.id_field))
                .fold(start, PollCursor::with_id)
        }
    });

    Detection {
        new_items,
        next_cursor,
    }
}

/// Polls one organization listing for new items
#[derive(Clone)]
pub struct IncrementalPoller {
    transport: Arc<dyn Transport>,
    config: PollerConfig,
    target: TriggerTarget,
}

impl IncrementalPoller {
    /// Create a poller for a target
    pub fn new(transport: Arc<dyn Transport>, config: PollerConfig, target: TriggerTarget) -> Self {
        Self {
            transport,
            config,
            target,
        }
    }

    /// Get the watched target
    pub fn target(&self) -> &TriggerTarget {
        &self.target
    }

    /// Get the poller config
    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Fetch the most recent page of the listing
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        let url = self.target.endpoint()?.url(&self.config.base_url)?;
        let query = FetchQuery::new()
            .per_page(self.config.page_size)
            .expand(&self.target.expand);

        match self
            .transport
            .request(Method::GET, url.as_str(), &query)
            .await?
        {
            JsonValue::Array(items) => Ok(items),
            other => {
                warn!(
                    "Expected a list from {}, got {}; treating as empty",
                    url,
                    json_kind(&other)
                );
                Ok(Vec::new())
            }
        }
    }

    /// Run one poll against `cursor`.
    ///
    /// On error the cursor is left exactly as it was.
    pub async fn poll(&self, cursor: &mut PollCursor, mode: PollMode) -> Result<PollOutcome> {
        let items = self.fetch_latest().await?;
        let key = self.target.key();

        if items.is_empty() {
            debug!("Poll {key}: listing is empty");
            return Ok(PollOutcome::Nothing);
        }

        if mode == PollMode::Manual {
            debug!("Poll {key}: manual run, previewing newest item");
            return Ok(PollOutcome::from_items(items.into_iter().take(1).collect()));
        }

        let detection = detect_new_items(&items, cursor, &self.config);
        if let Some(next) = detection.next_cursor {
            *cursor = next;
        }

        info!(
            "Poll {key}: {} fetched, {} new, cursor {}",
            items.len(),
            detection.new_items.len(),
            cursor.last_item_date.as_deref().unwrap_or("<unset>")
        );

        Ok(PollOutcome::from_items(detection.new_items))
    }

    /// Poll using the cursor stored in `state`, saving it when it moved
    pub async fn poll_with_state(&self, state: &StateManager, mode: PollMode) -> Result<PollOutcome> {
        let key = self.target.key();
        let mut cursor = state.get_cursor(&key).await;
        let before = cursor.clone();

        let outcome = self.poll(&mut cursor, mode).await?;

        if cursor != before {
            state.set_cursor(&key, cursor).await?;
        }

        Ok(outcome)
    }
}

impl std::fmt::Debug for IncrementalPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncrementalPoller")
            .field("config", &self.config)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
