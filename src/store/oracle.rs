//! Cached external price with freshness tracking

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use tracing::{debug, info};

use crate::encoding::PriceValue;
use crate::error::StoreError;
use crate::persist::{PRICE_KEY, PersistError, Persistence};
use crate::util::time::Clock;

/// A price paired with the time it was set
///
/// `last_updated` is 0 until the first accepted update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRecord {
    pub value: f64,
    /// Nanoseconds since the Unix epoch
    pub last_updated: u64,
}

/// Oracle cache holding one price record
///
/// The record is immutable and swapped as a whole, so readers never see a
/// value from one update with the timestamp of another. Writers are
/// serialized by `writer`.
pub struct PriceOracle {
    current: ArcSwap<PriceRecord>,
    writer: Mutex<()>,
    clock: Arc<dyn Clock>,
    persistence: Arc<dyn Persistence>,
}

impl PriceOracle {
    /// Create the oracle, restoring the last persisted record if any
    pub fn open(
        initial_price: f64,
        clock: Arc<dyn Clock>,
        persistence: Arc<dyn Persistence>,
    ) -> Result<Self, PersistError> {
        let record = match persistence.get(PRICE_KEY)? {
            Some(bytes) => {
                let stored = PriceValue::deserialize(&bytes).map_err(|source| {
                    PersistError::Decode {
                        key: PRICE_KEY.to_string(),
                        source,
                    }
                })?;
                info!(
                    "Restored price {} last updated at {}",
                    stored.value, stored.last_updated
                );
                PriceRecord {
                    value: stored.value,
                    last_updated: stored.last_updated,
                }
            }
            None => PriceRecord {
                value: initial_price,
                last_updated: 0,
            },
        };

        Ok(Self {
            current: ArcSwap::from_pointee(record),
            writer: Mutex::new(()),
            clock,
            persistence,
        })
    }

    pub fn price(&self) -> f64 {
        self.current.load().value
    }

    pub fn last_updated(&self) -> u64 {
        self.current.load().last_updated
    }

    /// Both fields from a single snapshot
    pub fn record(&self) -> PriceRecord {
        **self.current.load()
    }

    /// Replace the cached price
    ///
    /// Setting the price it already has changes nothing. Otherwise the
    /// timestamp moves to the clock's now, and always strictly forward.
    pub fn update_price(&self, value: f64) -> Result<PriceRecord, StoreError> {
        if !value.is_finite() {
            return Err(StoreError::InvalidValue(format!(
                "price must be a finite number, got {}",
                value
            )));
        }
        if value < 0.0 {
            return Err(StoreError::InvalidValue(format!(
                "price must be >= 0, got {}",
                value
            )));
        }
        // -0.0 is stored as 0.0
        let value = value + 0.0;

        let _guard = self.writer.lock().map_err(|_| PersistError::Poisoned)?;
        let current = **self.current.load();
        if current.value == value {
            return Ok(current);
        }

        let next = PriceRecord {
            value,
            last_updated: self
                .clock
                .now_ns()
                .max(current.last_updated.saturating_add(1)),
        };

        let encoded = PriceValue::new(next.value, next.last_updated).serialize();
        self.persistence.put(PRICE_KEY, &encoded)?;
        self.current.store(Arc::new(next));

        debug!("Price updated {} -> {} at {}", current.value, next.value, next.last_updated);
        Ok(next)
    }
}
