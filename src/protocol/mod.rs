//! Redis protocol implementation
//!
//! This module provides RESP (REdis Serialization Protocol) parsing and
//! maps RESP commands onto the store's operations.

pub mod admin;
pub mod catalog;
pub mod command;
pub mod oracle;
pub mod resp;
pub mod slot;

pub use command::{CommandFactory, Session};
pub use resp::{Parser, Value};
