//! Slot commands
//!
//! `GET <slot>` / `UPDATE <slot> <value>` name the slot as an argument,
//! `GET<SLOT>` / `UPDATE<SLOT> <value>` carry it in the command name.

pub mod get;
pub mod update;

pub use get::{GetCmd, NamedGetCmd};
pub use update::{NamedUpdateCmd, UpdateCmd};
