use std::sync::Arc;

use anyhow::{Context, Result};
use log::warn;
use serde_json::Value;

use crate::models::HistoryEntry;

use super::slots::SlotStore;

pub const HISTORY_SLOT: &str = "edgelens_diagnostic_history";
pub const HISTORY_LIMIT: usize = 10;

/// Most-recent-first log of diagnostic outcomes, capped at [`HISTORY_LIMIT`].
#[derive(Clone)]
pub struct HistoryStore {
    slots: Arc<dyn SlotStore>,
}

impl HistoryStore {
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }

    pub fn list(&self) -> Result<Vec<HistoryEntry>> {
        let Some(raw) = self.slots.read(HISTORY_SLOT)? else {
            return Ok(Vec::new());
        };

        let values = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(values) => values,
            Err(err) => {
                warn!("History slot is unreadable, treating it as empty: {err}");
                return Ok(Vec::new());
            }
        };

        // One malformed record must not cost the rest of the list.
        let mut entries: Vec<HistoryEntry> = values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Skipping unreadable history entry: {err}");
                    None
                }
            })
            .collect();
        entries.truncate(HISTORY_LIMIT);
        Ok(entries)
    }

    /// Prepends `entry` and returns the stored list.
    pub fn append(&self, entry: HistoryEntry) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.list()?;
        entries.insert(0, entry);
        entries.truncate(HISTORY_LIMIT);

        let serialized =
            serde_json::to_string(&entries).context("failed to serialize history")?;
        self.slots
            .write(HISTORY_SLOT, serialized)
            .context("failed to persist history")?;
        Ok(entries)
    }

    pub fn clear(&self) -> Result<()> {
        self.slots
            .remove(HISTORY_SLOT)
            .context("failed to clear history")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::{
        models::{Severity, ISSUE_CATALOG},
        storage::{FileSlotStore, MemorySlotStore},
    };

    fn entry(n: i64) -> HistoryEntry {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(n);
        HistoryEntry::diagnosed(format!("KETTLE-{n}"), &ISSUE_CATALOG[0], at)
    }

    #[test]
    fn never_exceeds_limit_and_keeps_newest_first() {
        let store = HistoryStore::new(Arc::new(MemorySlotStore::new()));
        for n in 0..25 {
            let entries = store.append(entry(n)).unwrap();
            assert!(entries.len() <= HISTORY_LIMIT);
        }

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), HISTORY_LIMIT);
        assert_eq!(entries[0].device_id, "KETTLE-24");
        assert_eq!(entries[HISTORY_LIMIT - 1].device_id, "KETTLE-15");
    }

    #[test]
    fn clear_empties_the_list() {
        let store = HistoryStore::new(Arc::new(MemorySlotStore::new()));
        store.append(entry(1)).unwrap();
        store.clear().unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn corrupt_slot_reads_as_empty_and_recovers_on_append() {
        let slots = Arc::new(MemorySlotStore::new());
        slots.write(HISTORY_SLOT, "not json".into()).unwrap();
        let store = HistoryStore::new(slots);

        assert!(store.list().unwrap().is_empty());
        let entries = store.append(entry(2)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Critical);
    }

    #[test]
    fn bad_entry_is_skipped_without_losing_the_others() {
        let slots = Arc::new(MemorySlotStore::new());
        let good = serde_json::to_value(vec![entry(3), entry(1)]).unwrap();
        let raw = serde_json::json!([
            good[0],
            {
                "deviceId": "KETTLE-EL-2041",
                "issue": "Won't turn on",
                "severity": "CRITICAL",
                "timestamp": "yesterday"
            },
            good[1]
        ]);
        slots.write(HISTORY_SLOT, raw.to_string()).unwrap();
        let store = HistoryStore::new(slots);

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].device_id, "KETTLE-3");
        assert_eq!(entries[1].device_id, "KETTLE-1");

        let entries = store.append(entry(4)).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.device_id.as_str()).collect();
        assert_eq!(ids, ["KETTLE-4", "KETTLE-3", "KETTLE-1"]);
    }

    #[test]
    fn history_persists_through_file_slots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        {
            let store = HistoryStore::new(Arc::new(FileSlotStore::new(path.clone()).unwrap()));
            store.append(entry(1)).unwrap();
            store.append(entry(2)).unwrap();
        }

        let store = HistoryStore::new(Arc::new(FileSlotStore::new(path).unwrap()));
        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].device_id, "KETTLE-2");
    }
}
