use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError, RwLock},
};

use anyhow::{Context, Result};
use log::{info, warn};

/// Named string slots, the local-storage equivalent the history lives in.
pub trait SlotStore: Send + Sync {
    fn read(&self, slot: &str) -> Result<Option<String>>;
    fn write(&self, slot: &str, value: String) -> Result<()>;
    fn remove(&self, slot: &str) -> Result<()>;
}

/// All slots in one JSON object on disk, loaded at startup and rewritten on
/// every change.
pub struct FileSlotStore {
    path: PathBuf,
    data: RwLock<BTreeMap<String, String>>,
}

impl FileSlotStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create storage directory {}", parent.display())
            })?;
        }

        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read slots from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Discarding unreadable slot file {}: {err}", path.display());
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        info!("Slot storage opened at {}", path.display());

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn persist(&self, data: &BTreeMap<String, String>) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write slots to {}", self.path.display()))
    }
}

impl SlotStore for FileSlotStore {
    fn read(&self, slot: &str) -> Result<Option<String>> {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(slot).cloned())
    }

    fn write(&self, slot: &str, value: String) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(slot.to_string(), value);
        self.persist(&guard)
    }

    fn remove(&self, slot: &str) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        if guard.remove(slot).is_some() {
            self.persist(&guard)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySlotStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlotStore {
    fn read(&self, slot: &str) -> Result<Option<String>> {
        let guard = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(slot).cloned())
    }

    fn write(&self, slot: &str, value: String) -> Result<()> {
        let mut guard = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(slot.to_string(), value);
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        let mut guard = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        guard.remove(slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_slots_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("slots.json");

        let store = FileSlotStore::new(path.clone()).unwrap();
        store.write("greeting", "hello".into()).unwrap();
        store.write("other", "x".into()).unwrap();
        store.remove("other").unwrap();

        let reopened = FileSlotStore::new(path).unwrap();
        assert_eq!(reopened.read("greeting").unwrap().as_deref(), Some("hello"));
        assert_eq!(reopened.read("other").unwrap(), None);
    }

    #[test]
    fn unreadable_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.json");
        fs::write(&path, "[1, 2").unwrap();

        let store = FileSlotStore::new(path).unwrap();
        assert_eq!(store.read("anything").unwrap(), None);
    }

    #[test]
    fn memory_slots_overwrite() {
        let store = MemorySlotStore::new();
        store.write("slot", "a".into()).unwrap();
        store.write("slot", "b".into()).unwrap();
        assert_eq!(store.read("slot").unwrap().as_deref(), Some("b"));
    }
}
