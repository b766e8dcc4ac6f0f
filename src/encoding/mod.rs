//! Value encoding/decoding for storage
//!
//! This module provides encoding and decoding for the records the store
//! hands to its persistence backend.

pub mod record;

/// Current format version for all encoded types
pub const CURRENT_VERSION: u8 = 1;

pub use record::{DecodeError, PriceValue, SlotValue};
