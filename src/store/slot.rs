use std::str::FromStr;

use derive_more::Display;

use crate::error::StoreError;

/// The fixed set of named text slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum Slot {
    #[display("book")]
    Book,
    #[display("contacts")]
    Contacts,
    #[display("course")]
    Course,
    #[display("path")]
    Path,
    #[display("time")]
    Time,
}

impl Slot {
    pub const COUNT: usize = 5;

    /// Every slot, in declaration order
    pub const ALL: [Slot; Slot::COUNT] = [
        Slot::Book,
        Slot::Contacts,
        Slot::Course,
        Slot::Path,
        Slot::Time,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Book => "book",
            Slot::Contacts => "contacts",
            Slot::Course => "course",
            Slot::Path => "path",
            Slot::Time => "time",
        }
    }

    /// Position of the slot in [`Slot::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Slot {
    type Err = StoreError;

    /// Names match case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| StoreError::UnknownSlot(s.to_string()))
    }
}
