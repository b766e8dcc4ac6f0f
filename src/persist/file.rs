//! Snapshot file backend
//!
//! The whole key space is kept in memory and rewritten to a JSON snapshot
//! on every put. The new snapshot goes to a sibling temp file which is
//! synced and renamed over the old one, so a crash leaves either the old or
//! the new snapshot on disk.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{PersistError, Persistence};

const SNAPSHOT_VERSION: u8 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    version: u8,
    /// key -> hex encoded value
    entries: BTreeMap<String, String>,
}

pub struct FileBackend {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileBackend {
    /// Open the snapshot at `path`, starting empty if it does not exist
    pub fn open(path: &Path) -> Result<Self, PersistError> {
        let entries = match fs::read(path) {
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
                snapshot.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    fn write_snapshot(&self, entries: &BTreeMap<String, String>) -> Result<(), PersistError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            entries: entries.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        let mut tmp_name = self.path.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;

        debug!("Wrote snapshot {} ({} bytes)", self.path.display(), bytes.len());
        Ok(())
    }
}

impl Persistence for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        let entries = self.entries.lock().map_err(|_| PersistError::Poisoned)?;
        match entries.get(key) {
            Some(encoded) => hex::decode(encoded)
                .map(Some)
                .map_err(|_| PersistError::Hex(key.to_string())),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().map_err(|_| PersistError::Poisoned)?;
        let previous = entries.insert(key.to_string(), hex::encode(value));

        if let Err(e) = self.write_snapshot(&entries) {
            // Keep the in-memory view in line with what is on disk.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reopen_restores_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let backend = FileBackend::open(&path).unwrap();
        backend.put("slot/book", b"moby dick").unwrap();
        backend.put("oracle/price", &[1, 2, 3]).unwrap();
        drop(backend);

        let reopened = FileBackend::open(&path).unwrap();
        assert_eq!(
            reopened.get("slot/book").unwrap(),
            Some(b"moby dick".to_vec())
        );
        assert_eq!(reopened.get("oracle/price").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(reopened.get("slot/time").unwrap(), None);
    }

    #[test]
    fn test_open_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let backend = FileBackend::open(&path).unwrap();
        backend.put("k", b"v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_rejects_malformed_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"not json").unwrap();

        assert!(matches!(
            FileBackend::open(&path),
            Err(PersistError::Snapshot(_))
        ));
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let backend = FileBackend::open(&path).unwrap();
        backend.put("k", b"old").unwrap();

        // A directory where the temp file should go makes the write fail.
        let mut tmp_name = path.clone().into_os_string();
        tmp_name.push(".tmp");
        fs::create_dir(PathBuf::from(tmp_name)).unwrap();

        assert!(backend.put("k", b"new").is_err());
        assert_eq!(backend.get("k").unwrap(), Some(b"old".to_vec()));
    }
}
