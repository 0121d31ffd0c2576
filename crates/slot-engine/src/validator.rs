//! Write-time validation of candidate events.
//!
//! Presence checks run first; the two business rules (opening uniqueness and
//! appointment bookability) only run once the kind is known and both
//! timestamps are present. Failures accumulate in a [`Validation`] report and
//! are never returned as `Err`: an `Err` from [`validate`] means the event
//! store itself failed.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::availability::available_slots;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::event::{EventDraft, EventKind};
use crate::slots::{slots_for, subtract_labels};
use crate::store::EventStore;

pub const BLANK: &str = "can't be blank";
pub const NOT_INCLUDED: &str = "is not included in the list";
pub const OPENING_EXISTS: &str = "opening already exists";
pub const NOT_BOOKABLE: &str = "appointment is not bookable";

/// Where a validation error is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Entity-level error, not tied to one field.
    Base,
    /// The event kind.
    Kind,
    /// The start timestamp.
    StartsAt,
    /// The end timestamp.
    EndsAt,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Base => "base",
            Field::Kind => "kind",
            Field::StartsAt => "starts_at",
            Field::EndsAt => "ends_at",
        }
    }
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Field the error is attached to, or [`Field::Base`].
    pub field: Field,
    /// Message without the field prefix.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Field::Base => f.write_str(&self.message),
            field => write!(f, "{}: {}", field.as_str(), self.message),
        }
    }
}

/// Outcome of validating one draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    errors: Vec<ValidationError>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Errors attached to `field`.
    pub fn on(&self, field: Field) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Human-readable messages, `"field: message"` or the bare base message.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    fn add(&mut self, field: Field, message: &str) {
        self.errors.push(ValidationError {
            field,
            message: message.to_string(),
        });
    }
}

/// Validate `draft` against the events currently in `store`.
///
/// The draft itself is not in the store, so an appointment is checked against
/// availability that does not yet include it.
///
/// # Errors
/// Propagates event-store failures; validation failures are in the report.
pub fn validate<S: EventStore + ?Sized>(
    draft: &EventDraft,
    store: &S,
    config: &EngineConfig,
) -> Result<Validation> {
    let mut report = Validation::default();

    // Kind is checked for inclusion only: a missing kind is simply not one of
    // the allowed values.
    let kind = draft.parsed_kind();
    if kind.is_none() {
        report.add(Field::Kind, NOT_INCLUDED);
    }
    if draft.starts_at.is_none() {
        report.add(Field::StartsAt, BLANK);
    }
    if draft.ends_at.is_none() {
        report.add(Field::EndsAt, BLANK);
    }

    let (Some(kind), Some(starts_at), Some(ends_at)) = (kind, draft.starts_at, draft.ends_at)
    else {
        return Ok(report);
    };

    match kind {
        EventKind::Opening => {
            if store.opening_exists(starts_at, ends_at)? {
                report.add(Field::Base, OPENING_EXISTS);
            }
        }
        EventKind::Appointment => {
            // Only the start date's availability is consulted, so an
            // appointment running past midnight needs its later slots to be
            // open on the start date too.
            let Some(candidate) = draft.to_event(0) else {
                return Ok(report);
            };
            let date = candidate.start_date(config.timezone);
            let wanted = slots_for(&candidate, config);
            let available = available_slots(store, date, config)?;
            let missing = subtract_labels(wanted, &available);
            if !missing.is_empty() {
                debug!(%date, ?missing, "appointment slots unavailable");
                report.add(Field::Base, NOT_BOOKABLE);
            }
        }
    }

    Ok(report)
}
