//! Persistence collaborators
//!
//! The store writes every accepted change through a [`Persistence`]
//! backend before publishing it, and reads the backend once at startup to
//! restore state. Backends are plain byte-value maps keyed by text.

mod file;
mod memory;
#[cfg(feature = "rocksdb")]
mod rocks;

pub use file::FileBackend;
pub use memory::MemoryBackend;
#[cfg(feature = "rocksdb")]
pub use rocks::RocksBackend;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::{Backend, StorageConfig};
use crate::encoding::DecodeError;

/// Key of the encoded price record
pub const PRICE_KEY: &str = "oracle/price";

/// Key of the encoded value of a slot
pub fn slot_key(name: &str) -> String {
    format!("slot/{}", name)
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("invalid hex payload under '{0}'")]
    Hex(String),
    #[error("corrupt record under '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: DecodeError,
    },
    #[error("backend error: {0}")]
    Backend(String),
    #[error("lock poisoned")]
    Poisoned,
}

/// Durable home for store state
pub trait Persistence: Send + Sync {
    /// Short backend name for logs and status
    fn name(&self) -> &'static str;

    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError>;

    /// Store `value` under `key`
    ///
    /// When this returns `Ok` the value must survive a restart of the
    /// process. A single call is all-or-nothing.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), PersistError>;

    /// Push buffered writes down to the medium
    fn flush(&self) -> Result<(), PersistError> {
        Ok(())
    }
}

/// Open the backend described by the storage configuration
pub fn open(config: &StorageConfig) -> Result<Arc<dyn Persistence>, PersistError> {
    let backend: Arc<dyn Persistence> = match config.backend {
        Backend::Memory => Arc::new(MemoryBackend::new()),
        Backend::File => Arc::new(FileBackend::open(&config.path)?),
        #[cfg(feature = "rocksdb")]
        Backend::RocksDb => Arc::new(RocksBackend::open(&config.path)?),
    };
    info!(
        "Opened {} persistence backend at {}",
        backend.name(),
        config.path.display()
    );
    Ok(backend)
}
