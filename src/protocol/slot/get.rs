use async_trait::async_trait;

use crate::protocol::command::{Command, Session, wrong_arity};
use crate::protocol::resp::Value;
use crate::store::Slot;

/// Parameters for GET command: GET slot
#[derive(Debug, Clone, PartialEq)]
pub struct GetParams {
    pub slot: String,
}

impl GetParams {
    /// Parse GET command parameters from RESP array items
    fn parse(items: &[Value]) -> Option<Self> {
        if items.len() != 2 {
            return None;
        }

        let slot = items[1].as_text()?;
        Some(GetParams { slot })
    }
}

/// GET command executor
pub struct GetCmd;

#[async_trait]
impl Command for GetCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        let params = match GetParams::parse(items) {
            Some(params) => params,
            None => return wrong_arity("get"),
        };

        match session.service.resources().get(&params.slot) {
            Ok(value) => Value::bulk(value),
            Err(e) => e.into(),
        }
    }
}

/// GET<SLOT> command executor, bound to one slot
pub struct NamedGetCmd {
    slot: Slot,
}

impl NamedGetCmd {
    pub fn new(slot: Slot) -> Self {
        Self { slot }
    }
}

#[async_trait]
impl Command for NamedGetCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        if items.len() != 1 {
            return wrong_arity(&format!("get{}", self.slot));
        }

        match session.service.resources().get_slot(self.slot) {
            Ok(value) => Value::bulk(value),
            Err(e) => e.into(),
        }
    }
}
