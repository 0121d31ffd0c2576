//! Shared entry point that serializes writes against an event store.
//!
//! Validation reads the store and then the event is inserted. Both steps run
//! under one write lock, so two concurrent writers cannot both see the same
//! opening span as new, or both book the last free slot.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::availability::{self, DayAvailability};
use crate::config::EngineConfig;
use crate::error::{Result, SlotError};
use crate::event::{Event, EventDraft};
use crate::store::{EventStore, MemoryStore};
use crate::validator::{self, Validation};

/// Thread-safe facade over an [`EventStore`].
///
/// Queries and validation share the read lock; [`Scheduler::create_event`]
/// holds the write lock from validation through insert.
#[derive(Debug)]
pub struct Scheduler<S> {
    /// Timezone, slot length and horizon for every query.
    config: EngineConfig,
    /// The backing store, guarded for concurrent callers.
    store: RwLock<S>,
}

impl Scheduler<MemoryStore> {
    /// Scheduler over an empty in-memory store.
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(MemoryStore::new(), config)
    }
}

impl<S: EventStore> Scheduler<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            config,
            store: RwLock::new(store),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn available_slots(&self, date: NaiveDate) -> Result<Vec<String>> {
        let store = self.read()?;
        availability::available_slots(&*store, date, &self.config)
    }

    pub fn availabilities(&self, start_date: NaiveDate) -> Result<Vec<DayAvailability>> {
        let store = self.read()?;
        availability::availabilities(&*store, start_date, &self.config)
    }

    /// Validate without writing.
    pub fn validate(&self, draft: &EventDraft) -> Result<Validation> {
        let store = self.read()?;
        validator::validate(draft, &*store, &self.config)
    }

    /// Validate and, if valid, insert `draft` as one atomic step.
    ///
    /// The outer `Result` carries store failures; the inner one is `Err` with
    /// the validation report when the draft is rejected.
    pub fn create_event(&self, draft: &EventDraft) -> Result<std::result::Result<Event, Validation>> {
        let mut store = self.write()?;

        let report = validator::validate(draft, &*store, &self.config)?;
        if !report.is_valid() {
            warn!(errors = ?report.messages(), "rejected event");
            return Ok(Err(report));
        }

        let event = store.insert(draft)?;
        info!(
            id = event.id,
            kind = %event.kind,
            starts_at = %event.starts_at,
            ends_at = %event.ends_at,
            weekly_recurring = event.weekly_recurring,
            "created event"
        );
        Ok(Ok(event))
    }

    /// Hand back the underlying store.
    pub fn into_store(self) -> Result<S> {
        self.store.into_inner().map_err(|_| SlotError::LockPoisoned)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, S>> {
        self.store.read().map_err(|_| SlotError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, S>> {
        self.store.write().map_err(|_| SlotError::LockPoisoned)
    }
}
