//! JSON schedule file as a [`ScheduleStore`].
//!
//! The file holds `{"sections": [...]}`. Reads deserialize into [`SectionRow`],
//! which normalizes integer ids and grade levels to strings. Updates do not: they
//! patch `start_time`/`end_time` on the raw JSON of every row in the slot, so
//! integers stay integers and keys the engine does not know about survive. The
//! new file is written next to the old one and renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use timetable_engine::{ScheduleStore, SectionRow, StoreError, TimeSlotId};

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleFile {
    #[serde(default)]
    pub sections: Vec<SectionRow>,
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the next version is written to before the rename.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn unavailable(&self, err: impl std::fmt::Display) -> StoreError {
        StoreError::Unavailable(format!("{}: {}", self.path.display(), err))
    }

    async fn read(&self) -> Result<ScheduleFile, StoreError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.unavailable(e))?;
        if content.trim().is_empty() {
            return Ok(ScheduleFile::default());
        }
        serde_json::from_str(&content).map_err(|e| self.unavailable(e))
    }
}

#[async_trait]
impl ScheduleStore for JsonFileStore {
    async fn fetch_sections(&self) -> Result<Vec<SectionRow>, StoreError> {
        Ok(self.read().await?.sections)
    }

    async fn update_time_slot(
        &self,
        slot: &TimeSlotId,
        start: &str,
        end: &str,
    ) -> Result<(), StoreError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.unavailable(e))?;
        let mut file: Value = serde_json::from_str(&content).map_err(|e| self.unavailable(e))?;

        let mut found = false;
        if let Some(rows) = file.get_mut("sections").and_then(Value::as_array_mut) {
            for row in rows.iter_mut().filter(|r| slot_matches(r, slot)) {
                if let Some(fields) = row.as_object_mut() {
                    fields.insert("start_time".to_string(), Value::from(start));
                    fields.insert("end_time".to_string(), Value::from(end));
                    found = true;
                }
            }
        }
        if !found {
            return Err(StoreError::SlotNotFound(slot.clone()));
        }

        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| StoreError::Rejected(e.to_string()))?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, json)
            .await
            .map_err(|e| self.unavailable(e))?;
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(self.unavailable(e));
        }
        Ok(())
    }
}

/// Compare a raw row's `time_slot_id` the way [`TimeSlotId`] ingestion does.
fn slot_matches(row: &Value, slot: &TimeSlotId) -> bool {
    match row.get("time_slot_id") {
        Some(Value::Number(n)) => n.to_string() == slot.as_str(),
        Some(Value::String(s)) => s.trim() == slot.as_str(),
        _ => false,
    }
}
