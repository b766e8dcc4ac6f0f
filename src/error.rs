//! Error types shared across the crate

use thiserror::Error;

use crate::config::ConfigError;
use crate::persist::PersistError;

/// Failure of a single store operation
///
/// A call that returns one of these has left the store unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown slot '{0}'")]
    UnknownSlot(String),
    #[error("unknown product '{0}'")]
    UnknownProduct(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("storage failure: {0}")]
    Storage(#[from] PersistError),
}

impl StoreError {
    /// Stable error code reported to remote callers
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::UnknownSlot(_) => "UNKNOWNSLOT",
            StoreError::UnknownProduct(_) => "UNKNOWNPRODUCT",
            StoreError::InvalidValue(_) => "INVALIDVALUE",
            StoreError::Storage(_) => "STORAGE",
        }
    }
}

/// Failure while bringing the service up
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open storage: {0}")]
    Persist(#[from] PersistError),
}
