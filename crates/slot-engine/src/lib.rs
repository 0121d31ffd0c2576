//! # slot-engine
//!
//! Bookable appointment slots from openings and appointments.
//!
//! Openings declare when appointments may be booked, optionally repeating
//! every week. Each event's span is cut into fixed 30-minute slots labelled by
//! local start time ("9:30"). A day's availability is the opening slots of
//! every event occurring that day, minus the slots already consumed by
//! appointments. New events are validated against that same computation.
//!
//! ## Modules
//!
//! - [`event`] — `Event`, `EventDraft`, `EventKind`, timestamp parsing
//! - [`slots`] — span → slot labels, per-occurrence label subtraction
//! - [`recurrence`] — one-off / weekly date matching
//! - [`store`] — `EventStore` contract and the in-memory `MemoryStore`
//! - [`availability`] — per-day and 7-day availability
//! - [`validator`] — opening uniqueness and appointment bookability
//! - [`scheduler`] — lock-serialized validate-then-insert
//! - [`config`] — timezone, slot length, horizon
//! - [`error`] — Error types

pub mod availability;
pub mod config;
pub mod error;
pub mod event;
pub mod recurrence;
pub mod scheduler;
pub mod slots;
pub mod store;
pub mod validator;

pub use availability::{available_slots, availabilities, DayAvailability};
pub use config::EngineConfig;
pub use error::SlotError;
pub use event::{parse_timestamp, Event, EventDraft, EventId, EventKind, EventRecord};
pub use recurrence::occurs_on;
pub use scheduler::Scheduler;
pub use slots::slots_for;
pub use store::{EventStore, MemoryStore};
pub use validator::{validate, Field, Validation, ValidationError};
