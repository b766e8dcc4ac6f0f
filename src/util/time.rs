//! Time utility functions

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock timestamps for the store
pub trait Clock: Send + Sync {
  /// Current time in nanoseconds since the Unix epoch
  fn now_ns(&self) -> u64;
}

/// Clock backed by the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now_ns(&self) -> u64 {
    now_ns()
  }
}

/// Get the current timestamp in nanoseconds
///
/// A clock set before the epoch reads as 0 rather than failing.
pub fn now_ns() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    .unwrap_or(0)
}
