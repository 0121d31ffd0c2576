//! Decompose an event's span into fixed-length slots, and reconcile slot labels.
//!
//! Slots are identified by the local wall-clock time of their start, rendered
//! as `H:MM` with no leading zero on the hour ("9:30", "13:30").

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::config::EngineConfig;
use crate::event::Event;

/// Slot start instants of `event`, stepping by the configured slot length.
///
/// Iteration is half-open over epoch seconds: starts are generated while they
/// are strictly before `ends_at`, then a trailing partial slot is dropped, so
/// the count is `floor((ends_at - starts_at) / slot)`. Spans with
/// `ends_at <= starts_at` are empty.
pub fn slot_starts(event: &Event, config: &EngineConfig) -> Vec<DateTime<Utc>> {
    let step = i64::from(config.slot_minutes) * 60;
    let end = event.ends_at.timestamp();
    let mut starts = Vec::new();
    let mut second = event.starts_at.timestamp();

    while second < end {
        if let Some(dt) = DateTime::from_timestamp(second, 0) {
            starts.push(dt);
        }
        second += step;
    }

    // Whole slots only: drop a trailing start whose slot would run past `ends_at`.
    if let Some(last) = starts.last() {
        if last.timestamp() + step > end {
            starts.pop();
        }
    }

    starts
}

/// Slot labels of `event`, in time order.
pub fn slots_for(event: &Event, config: &EngineConfig) -> Vec<String> {
    slot_starts(event, config)
        .into_iter()
        .map(|start| slot_label(start, config.timezone))
        .collect()
}

/// Render a slot start as `H:MM` in `tz`.
pub fn slot_label(start: DateTime<Utc>, tz: Tz) -> String {
    let local = start.with_timezone(&tz);
    format!("{}:{:02}", local.hour(), local.minute())
}

/// Remove `taken` labels from `offered`, one occurrence per taken label.
///
/// Each label in `taken` removes the earliest remaining equal label in
/// `offered`; taken labels with no remaining match are ignored. The relative
/// order of what is left is preserved.
pub fn subtract_labels(offered: Vec<String>, taken: &[String]) -> Vec<String> {
    let mut remaining: Vec<Option<String>> = offered.into_iter().map(Some).collect();

    for label in taken {
        if let Some(slot) = remaining
            .iter_mut()
            .find(|slot| slot.as_deref() == Some(label.as_str()))
        {
            *slot = None;
        }
    }

    remaining.into_iter().flatten().collect()
}
