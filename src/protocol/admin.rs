//! Introspection commands: PING, STATUS, WHOAMI, SLOTS

use async_trait::async_trait;

use crate::protocol::command::{Command, Session, wrong_arity};
use crate::protocol::resp::Value;

/// PING [message]
pub struct PingCmd;

#[async_trait]
impl Command for PingCmd {
    async fn execute(&self, items: &[Value], _session: &Session) -> Value {
        match items {
            [_] => Value::SimpleString("PONG".to_string()),
            [_, message] => match message.as_text() {
                Some(text) => Value::bulk(text),
                None => Value::error("ERR invalid message argument"),
            },
            _ => wrong_arity("ping"),
        }
    }
}

pub struct StatusCmd;

#[async_trait]
impl Command for StatusCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        if items.len() != 1 {
            return wrong_arity("status");
        }
        Value::bulk(session.service.status())
    }
}

pub struct WhoamiCmd;

#[async_trait]
impl Command for WhoamiCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        if items.len() != 1 {
            return wrong_arity("whoami");
        }
        Value::bulk(session.service.whoami(&session.identity).to_string())
    }
}

/// SLOTS: declared slot names
pub struct SlotsCmd;

#[async_trait]
impl Command for SlotsCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        if items.len() != 1 {
            return wrong_arity("slots");
        }
        Value::bulk_array(session.service.resources().slots())
    }
}
