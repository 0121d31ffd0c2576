//! Per-day availability: opening slots minus appointment slots.
//!
//! For a date, every opening occurring on it contributes its slot labels and
//! every appointment occurring on it consumes one matching label per slot.
//! What remains is bookable. [`availabilities`] repeats this over the
//! configured lookahead horizon.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::event::Event;
use crate::slots::{slots_for, subtract_labels};
use crate::store::EventStore;

/// Bookable slots of a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    /// Calendar date in the configured timezone, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Free `H:MM` labels in opening order.
    pub slots: Vec<String>,
}

/// Bookable slot labels on `date`.
///
/// Opening labels keep their enumeration order (store order, then slot time);
/// each appointment label removes one equal opening label.
///
/// # Errors
/// Propagates event-store failures.
pub fn available_slots<S: EventStore + ?Sized>(
    store: &S,
    date: NaiveDate,
    config: &EngineConfig,
) -> Result<Vec<String>> {
    let events = store.events_for_date(date, config.timezone)?;
    Ok(resolve_day(date, &events, config))
}

/// Availability for `config.horizon_days` consecutive days from `start_date`.
///
/// Always returns exactly `horizon_days` entries, in date order.
///
/// # Errors
/// Propagates event-store failures, including `SlotError::DateOutOfRange`
/// when the horizon runs past the last representable date.
pub fn availabilities<S: EventStore + ?Sized>(
    store: &S,
    start_date: NaiveDate,
    config: &EngineConfig,
) -> Result<Vec<DayAvailability>> {
    let days = store.events_for_range(start_date, config.horizon_days, config.timezone)?;

    Ok(days
        .into_iter()
        .map(|(date, events)| DayAvailability {
            date,
            slots: resolve_day(date, &events, config),
        })
        .collect())
}

/// Partition one day's events by kind and subtract appointment labels.
fn resolve_day(date: NaiveDate, events: &[Event], config: &EngineConfig) -> Vec<String> {
    let (openings, appointments): (Vec<&Event>, Vec<&Event>) =
        events.iter().partition(|event| event.is_opening());

    let offered: Vec<String> = openings
        .iter()
        .flat_map(|event| slots_for(event, config))
        .collect();
    let taken: Vec<String> = appointments
        .iter()
        .flat_map(|event| slots_for(event, config))
        .collect();

    let available = subtract_labels(offered, &taken);

    debug!(
        %date,
        openings = openings.len(),
        appointments = appointments.len(),
        available = available.len(),
        "resolved day availability"
    );

    available
}
