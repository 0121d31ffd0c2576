//! The event-store contract the engine reads from and writes to, plus an
//! in-memory implementation.

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{Result, SlotError};
use crate::event::{Event, EventDraft, EventId, EventKind};
use crate::recurrence::occurs_on;

/// Data-access collaborator for events.
///
/// Stores hold instants only. The timezone that turns them into calendar dates
/// and weekdays is passed in by the caller on every query, so it always
/// matches the one used for slot labels.
///
/// Implementations backed by a database are expected to translate
/// [`occurs_on`] into their query language without changing its grouping.
pub trait EventStore {
    /// Events occurring on `date` in `tz`, in insertion order.
    fn events_for_date(&self, date: NaiveDate, tz: Tz) -> Result<Vec<Event>>;

    /// Events for each of `days` consecutive dates starting at `start`.
    ///
    /// The default calls [`EventStore::events_for_date`] once per day; stores
    /// that can fetch a range in one round trip should override it.
    ///
    /// # Errors
    /// Returns `SlotError::DateOutOfRange` if the range runs past the last
    /// representable date.
    fn events_for_range(
        &self,
        start: NaiveDate,
        days: u32,
        tz: Tz,
    ) -> Result<Vec<(NaiveDate, Vec<Event>)>> {
        (0..days)
            .map(|offset| {
                let date = start
                    .checked_add_days(Days::new(u64::from(offset)))
                    .ok_or(SlotError::DateOutOfRange { start, days })?;
                Ok((date, self.events_for_date(date, tz)?))
            })
            .collect()
    }

    /// Whether an opening with exactly this span is stored.
    fn opening_exists(&self, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<bool>;

    /// Persist a validated draft and return the stored event.
    fn insert(&mut self, draft: &EventDraft) -> Result<Event>;
}

/// Vector-backed store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    /// Stored events in insertion order.
    events: Vec<Event>,
    /// Id handed to the next inserted event.
    next_id: EventId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore for MemoryStore {
    fn events_for_date(&self, date: NaiveDate, tz: Tz) -> Result<Vec<Event>> {
        Ok(self
            .events
            .iter()
            .filter(|event| occurs_on(event, date, tz))
            .cloned()
            .collect())
    }

    fn opening_exists(&self, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<bool> {
        Ok(self
            .events
            .iter()
            .any(|e| e.is_opening() && e.starts_at == starts_at && e.ends_at == ends_at))
    }

    fn insert(&mut self, draft: &EventDraft) -> Result<Event> {
        let event = draft.to_event(self.next_id).ok_or_else(|| {
            SlotError::Store("cannot insert an event with missing fields".to_string())
        })?;

        // Unique index on (kind = opening, starts_at, ends_at).
        if event.kind == EventKind::Opening && self.opening_exists(event.starts_at, event.ends_at)? {
            return Err(SlotError::DuplicateOpening {
                starts_at: event.starts_at,
                ends_at: event.ends_at,
            });
        }

        self.next_id += 1;
        self.events.push(event.clone());
        Ok(event)
    }
}
