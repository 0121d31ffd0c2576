//! Error types for slot-engine operations.
//!
//! Validation failures on a candidate event are *not* errors: they are reported
//! through [`crate::validator::Validation`]. `SlotError` covers infrastructure
//! and input-parsing failures only.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    #[error("Event store error: {0}")]
    Store(String),

    #[error("Invalid event kind: {0}")]
    InvalidKind(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Opening {starts_at} - {ends_at} already exists")]
    DuplicateOpening {
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },

    #[error("{days} days from {start} run past the last supported date")]
    DateOutOfRange { start: NaiveDate, days: u32 },

    #[error("Event store lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, SlotError>;
