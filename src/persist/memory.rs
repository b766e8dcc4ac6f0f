use std::collections::HashMap;
use std::sync::RwLock;

use super::{PersistError, Persistence};

/// In-memory backend, state lives as long as the process
pub struct MemoryBackend {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create a new empty backend
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Persistence for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        let data = self.data.read().map_err(|_| PersistError::Poisoned)?;
        Ok(data.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), PersistError> {
        let mut data = self.data.write().map_err(|_| PersistError::Poisoned)?;
        data.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let backend = MemoryBackend::new();
        backend.put("slot/book", b"v1").unwrap();
        backend.put("slot/book", b"v2").unwrap();

        assert_eq!(backend.get("slot/book").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(backend.get("slot/path").unwrap(), None);
    }
}
