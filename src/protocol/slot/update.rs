use async_trait::async_trait;

use crate::protocol::command::{Command, Session, wrong_arity};
use crate::error::StoreError;
use crate::protocol::resp::Value;
use crate::store::Slot;

/// Parameters for UPDATE command: UPDATE slot value
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateParams {
    pub slot: String,
    /// Raw payload, checked for utf-8 before it reaches the store
    pub value: Vec<u8>,
}

impl UpdateParams {
    /// Parse UPDATE command parameters from RESP array items
    fn parse(items: &[Value]) -> Option<Self> {
        if items.len() != 3 {
            return None;
        }

        let slot = items[1].as_text()?;
        let value = items[2].as_bytes()?;
        Some(UpdateParams { slot, value })
    }
}

/// Slot payloads must be well-formed text
fn slot_text(value: Vec<u8>) -> Result<String, StoreError> {
    String::from_utf8(value)
        .map_err(|_| StoreError::InvalidValue("slot value is not valid utf-8".to_string()))
}

/// UPDATE command executor
///
/// Replies with the value now stored in the slot.
pub struct UpdateCmd;

#[async_trait]
impl Command for UpdateCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        let params = match UpdateParams::parse(items) {
            Some(params) => params,
            None => return wrong_arity("update"),
        };

        let result = slot_text(params.value)
            .and_then(|value| session.service.resources().update(&params.slot, value));
        match result {
            Ok(stored) => Value::bulk(stored),
            Err(e) => e.into(),
        }
    }
}

/// UPDATE<SLOT> command executor, bound to one slot
pub struct NamedUpdateCmd {
    slot: Slot,
}

impl NamedUpdateCmd {
    pub fn new(slot: Slot) -> Self {
        Self { slot }
    }
}

#[async_trait]
impl Command for NamedUpdateCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        let value = match items {
            [_, value] => value.as_bytes(),
            _ => None,
        };
        let Some(value) = value else {
            return wrong_arity(&format!("update{}", self.slot));
        };

        let result = slot_text(value)
            .and_then(|value| session.service.resources().update_slot(self.slot, value));
        match result {
            Ok(stored) => Value::bulk(stored),
            Err(e) => e.into(),
        }
    }
}
