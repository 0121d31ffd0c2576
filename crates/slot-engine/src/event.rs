//! The event model: openings and appointments on a timeline.
//!
//! [`Event`] is a stored, validated event. [`EventDraft`] is a candidate whose
//! fields may still be missing or malformed; it only becomes an `Event` after
//! passing [`crate::validator::validate`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// Store-assigned identifier, increasing in insertion order.
pub type EventId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A span during which appointments may be booked.
    Opening,
    /// A booked span consuming slots of an opening.
    Appointment,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Opening => "opening",
            EventKind::Appointment => "appointment",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "opening" => Ok(EventKind::Opening),
            "appointment" => Ok(EventKind::Appointment),
            other => Err(SlotError::InvalidKind(other.to_string())),
        }
    }
}

/// A stored event. Only validated drafts become events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Assigned by the store on insert, increasing in insertion order.
    pub id: EventId,
    /// Opening or appointment.
    pub kind: EventKind,
    /// Start instant; the first slot begins here.
    pub starts_at: DateTime<Utc>,
    /// End instant, exclusive. Earlier than `starts_at` yields no slots.
    pub ends_at: DateTime<Utc>,
    /// Repeats on the weekday of `starts_at`, every week from its start date on.
    #[serde(default)]
    pub weekly_recurring: bool,
}

impl Event {
    pub fn is_opening(&self) -> bool {
        self.kind == EventKind::Opening
    }

    pub fn is_appointment(&self) -> bool {
        self.kind == EventKind::Appointment
    }

    /// Calendar date of `starts_at` as seen in `tz`.
    pub fn start_date(&self, tz: Tz) -> NaiveDate {
        self.starts_at.with_timezone(&tz).date_naive()
    }
}

/// A candidate event as submitted by a caller, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Raw kind as submitted; anything but `opening` or `appointment` fails
    /// validation.
    #[serde(default)]
    pub kind: Option<String>,
    /// Start instant, `None` when not submitted.
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// End instant, `None` when not submitted.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Weekly repetition flag.
    #[serde(default)]
    pub weekly_recurring: bool,
}

impl EventDraft {
    pub fn new(kind: EventKind, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        Self {
            kind: Some(kind.as_str().to_string()),
            starts_at: Some(starts_at),
            ends_at: Some(ends_at),
            weekly_recurring: false,
        }
    }

    pub fn opening(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        Self::new(EventKind::Opening, starts_at, ends_at)
    }

    pub fn appointment(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        Self::new(EventKind::Appointment, starts_at, ends_at)
    }

    pub fn weekly(mut self) -> Self {
        self.weekly_recurring = true;
        self
    }

    /// The parsed kind, if present and one of the known variants.
    pub fn parsed_kind(&self) -> Option<EventKind> {
        self.kind.as_deref().and_then(|k| k.parse().ok())
    }

    /// Build the stored form once every required field is present.
    ///
    /// Returns `None` when the kind is missing or unknown, or when a timestamp
    /// is missing.
    pub fn to_event(&self, id: EventId) -> Option<Event> {
        Some(Event {
            id,
            kind: self.parsed_kind()?,
            starts_at: self.starts_at?,
            ends_at: self.ends_at?,
            weekly_recurring: self.weekly_recurring,
        })
    }
}

/// Serialized form of an event in an events file: textual timestamps that are
/// resolved against the configured timezone on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Opening or appointment.
    pub kind: EventKind,
    /// RFC 3339, or a local `YYYY-MM-DD HH:MM[:SS]` wall-clock time.
    pub starts_at: String,
    /// Same formats as `starts_at`.
    pub ends_at: String,
    /// Weekly repetition flag, `false` when omitted.
    #[serde(default)]
    pub weekly_recurring: bool,
}

impl EventRecord {
    pub fn from_event(event: &Event, tz: Tz) -> Self {
        Self {
            kind: event.kind,
            starts_at: event.starts_at.with_timezone(&tz).to_rfc3339(),
            ends_at: event.ends_at.with_timezone(&tz).to_rfc3339(),
            weekly_recurring: event.weekly_recurring,
        }
    }

    pub fn to_draft(&self, tz: Tz) -> Result<EventDraft> {
        Ok(EventDraft {
            kind: Some(self.kind.as_str().to_string()),
            starts_at: Some(parse_timestamp(&self.starts_at, tz)?),
            ends_at: Some(parse_timestamp(&self.ends_at, tz)?),
            weekly_recurring: self.weekly_recurring,
        })
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp into an instant.
///
/// RFC 3339 strings (with an offset) are taken as-is. Naive strings such as
/// "2014-08-04 09:30" are wall-clock times in `tz`; an ambiguous local time
/// (DST fall-back) resolves to the earlier instant, a non-existent one
/// (DST spring-forward gap) is an error.
pub fn parse_timestamp(s: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| SlotError::InvalidTimestamp(s.to_string()))?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(SlotError::InvalidTimestamp(format!(
            "{} does not exist in {}",
            s, tz
        ))),
    }
}
