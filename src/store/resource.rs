use std::sync::{Arc, RwLock};

use tracing::debug;

use super::slot::Slot;
use crate::encoding::SlotValue;
use crate::error::StoreError;
use crate::persist::{PersistError, Persistence, slot_key};

/// Named text slots with get/update access
///
/// Every slot always holds a value. Writes go to the persistence backend
/// first and are published only once the backend accepted them.
pub struct ResourceStore {
    values: RwLock<[String; Slot::COUNT]>,
    persistence: Arc<dyn Persistence>,
}

impl ResourceStore {
    /// Create the store with configured initial values
    ///
    /// Values already held by the backend win over the configured ones.
    /// Slots without either start empty.
    pub fn open(
        initial: impl IntoIterator<Item = (Slot, String)>,
        persistence: Arc<dyn Persistence>,
    ) -> Result<Self, PersistError> {
        let mut values: [String; Slot::COUNT] = Default::default();
        for (slot, value) in initial {
            values[slot.index()] = value;
        }

        for slot in Slot::ALL {
            let key = slot_key(slot.as_str());
            if let Some(bytes) = persistence.get(&key)? {
                let stored = SlotValue::deserialize(&bytes)
                    .map_err(|source| PersistError::Decode { key, source })?;
                values[slot.index()] = stored.text;
            }
        }

        Ok(Self {
            values: RwLock::new(values),
            persistence,
        })
    }

    /// Read a slot by name
    pub fn get(&self, name: &str) -> Result<String, StoreError> {
        self.get_slot(name.parse()?)
    }

    pub fn get_slot(&self, slot: Slot) -> Result<String, StoreError> {
        let values = self.values.read().map_err(|_| PersistError::Poisoned)?;
        Ok(values[slot.index()].clone())
    }

    /// Replace a slot's value by name, returning the stored value
    pub fn update(&self, name: &str, value: String) -> Result<String, StoreError> {
        self.update_slot(name.parse()?, value)
    }

    pub fn update_slot(&self, slot: Slot, value: String) -> Result<String, StoreError> {
        let mut values = self.values.write().map_err(|_| PersistError::Poisoned)?;

        let encoded = SlotValue::new(value.as_str()).serialize();
        self.persistence.put(&slot_key(slot.as_str()), &encoded)?;

        debug!("Updated slot {} ({} bytes)", slot, value.len());
        values[slot.index()] = value;
        Ok(values[slot.index()].clone())
    }

    /// Declared slot names in declaration order
    pub fn slots(&self) -> Vec<&'static str> {
        Slot::ALL.iter().map(|slot| slot.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryBackend;
    use crate::store::testing::FailingBackend;

    fn store() -> ResourceStore {
        ResourceStore::open([], Arc::new(MemoryBackend::new())).unwrap()
    }

    #[test]
    fn test_slots_start_empty() {
        let store = store();
        for slot in Slot::ALL {
            assert_eq!(store.get_slot(slot).unwrap(), "");
        }
    }

    #[test]
    fn test_update_then_get() {
        let store = store();
        for (i, slot) in Slot::ALL.into_iter().enumerate() {
            let value = format!("value-{}", i);
            assert_eq!(store.update(slot.as_str(), value.clone()).unwrap(), value);
            assert_eq!(store.get(slot.as_str()).unwrap(), value);
        }
    }

    #[test]
    fn test_update_is_idempotent() {
        let store = store();
        store.update("course", "rust 101".to_string()).unwrap();
        let once = store.get("course").unwrap();
        store.update("course", "rust 101".to_string()).unwrap();

        assert_eq!(store.get("course").unwrap(), once);
        assert_eq!(store.get("book").unwrap(), "");
    }

    #[test]
    fn test_unknown_slot() {
        let store = store();
        assert!(matches!(store.get("shelf"), Err(StoreError::UnknownSlot(_))));
        assert!(matches!(
            store.update("shelf", "x".to_string()),
            Err(StoreError::UnknownSlot(_))
        ));
    }

    #[test]
    fn test_initial_values() {
        let store = ResourceStore::open(
            [(Slot::Path, "/grain".to_string())],
            Arc::new(MemoryBackend::new()),
        )
        .unwrap();
        assert_eq!(store.get("path").unwrap(), "/grain");
        assert_eq!(store.get("time").unwrap(), "");
    }

    #[test]
    fn test_restore_from_backend() {
        let backend: Arc<dyn Persistence> = Arc::new(MemoryBackend::new());
        let store = ResourceStore::open([], backend.clone()).unwrap();
        store.update("contacts", "alice, bob".to_string()).unwrap();
        drop(store);

        let reopened = ResourceStore::open(
            [(Slot::Contacts, "configured".to_string())],
            backend,
        )
        .unwrap();
        assert_eq!(reopened.get("contacts").unwrap(), "alice, bob");
    }

    #[test]
    fn test_corrupt_backend_value() {
        let backend = Arc::new(MemoryBackend::new());
        backend.put("slot/book", b"\x01\x00").unwrap();

        assert!(matches!(
            ResourceStore::open([], backend),
            Err(PersistError::Decode { key, .. }) if key == "slot/book"
        ));
    }

    #[test]
    fn test_failed_persist_leaves_value() {
        let backend = Arc::new(FailingBackend::default());
        let store = ResourceStore::open([(Slot::Book, "old".to_string())], backend.clone()).unwrap();

        backend.fail_writes(true);
        assert!(matches!(
            store.update("book", "new".to_string()),
            Err(StoreError::Storage(_))
        ));
        assert_eq!(store.get("book").unwrap(), "old");
    }

    #[test]
    fn test_slot_listing() {
        assert_eq!(
            store().slots(),
            vec!["book", "contacts", "course", "path", "time"]
        );
    }
}
