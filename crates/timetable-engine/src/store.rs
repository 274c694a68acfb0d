//! The store seam: a full read of section rows and a per-time-slot update.
//!
//! The engine never talks to a database directly. Whatever backs the schedule
//! implements [`ScheduleStore`]; [`MemoryStore`] is the in-memory implementation
//! used by tests and local tooling.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{SectionRow, TimeSlotId};

/// Errors reported by a store implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Time slot not found: {0}")]
    SlotNotFound(TimeSlotId),

    #[error("Store rejected update: {0}")]
    Rejected(String),
}

/// Read/update endpoint backing the schedule.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so a coordinator can be moved across
/// tasks, even though the engine itself only ever has one call in flight.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Fetch every section row. An empty result is an empty schedule.
    async fn fetch_sections(&self) -> Result<Vec<SectionRow>, StoreError>;

    /// Persist a new time of day for one time slot. `start` and `end` are `HH:MM:SS`.
    async fn update_time_slot(
        &self,
        slot: &TimeSlotId,
        start: &str,
        end: &str,
    ) -> Result<(), StoreError>;
}

/// In-memory store holding section rows behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<SectionRow>>,
}

impl MemoryStore {
    pub fn new(rows: Vec<SectionRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    /// Snapshot of the current rows.
    pub fn sections(&self) -> Vec<SectionRow> {
        match self.rows.lock() {
            Ok(rows) => rows.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn fetch_sections(&self) -> Result<Vec<SectionRow>, StoreError> {
        let rows = self
            .rows
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(rows.clone())
    }

    async fn update_time_slot(
        &self,
        slot: &TimeSlotId,
        start: &str,
        end: &str,
    ) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut found = false;
        for row in rows.iter_mut().filter(|r| &r.time_slot_id == slot) {
            row.start_time = start.to_string();
            row.end_time = end.to_string();
            found = true;
        }

        if found {
            Ok(())
        } else {
            Err(StoreError::SlotNotFound(slot.clone()))
        }
    }
}
