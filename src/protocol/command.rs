use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::protocol::admin::{PingCmd, SlotsCmd, StatusCmd, WhoamiCmd};
use crate::protocol::catalog::{GetHomePageCmd, GetProductCmd, GetProductsCmd};
use crate::protocol::oracle::{GetLastPriceUpdateCmd, GetPriceCmd, UpdatePriceCmd};
use crate::protocol::resp::Value;
use crate::protocol::slot::{GetCmd, NamedGetCmd, NamedUpdateCmd, UpdateCmd};
use crate::store::{Identity, Service, Slot};

/// Per-connection call context
pub struct Session {
    pub service: Arc<Service>,
    /// Identity the transport assigned to the caller
    pub identity: Identity,
}

impl Session {
    pub fn new(service: Arc<Service>, identity: Identity) -> Self {
        Self { service, identity }
    }
}

/// A command executor
///
/// `items` is the whole request array, command name included.
#[async_trait]
pub trait Command: Send + Sync {
    async fn execute(&self, items: &[Value], session: &Session) -> Value;
}

/// Error reply for a bad argument count
pub fn wrong_arity(name: &str) -> Value {
    Value::error(format!(
        "ERR wrong number of arguments for '{}' command",
        name.to_lowercase()
    ))
}

/// Registry of command executors by upper-cased name
pub struct CommandFactory {
    commands: HashMap<String, Arc<dyn Command>>,
}

impl CommandFactory {
    /// Register all supported commands
    pub fn init() -> Self {
        let mut factory = Self {
            commands: HashMap::new(),
        };

        factory.register("PING", PingCmd);
        factory.register("STATUS", StatusCmd);
        factory.register("WHOAMI", WhoamiCmd);
        factory.register("SLOTS", SlotsCmd);

        factory.register("GET", GetCmd);
        factory.register("UPDATE", UpdateCmd);
        for slot in Slot::ALL {
            let name = slot.as_str().to_uppercase();
            factory.register(&format!("GET{}", name), NamedGetCmd::new(slot));
            factory.register(&format!("UPDATE{}", name), NamedUpdateCmd::new(slot));
        }

        factory.register("GETPRICE", GetPriceCmd);
        factory.register("GETICPPRICE", GetPriceCmd);
        factory.register("GETLASTPRICEUPDATE", GetLastPriceUpdateCmd);
        factory.register("UPDATEPRICE", UpdatePriceCmd);
        factory.register("UPDATEICPPRICE", UpdatePriceCmd);

        factory.register("GETPRODUCT", GetProductCmd);
        factory.register("GETPRODUCTS", GetProductsCmd);
        factory.register("GETHOMEPAGE", GetHomePageCmd);

        factory
    }

    fn register(&mut self, name: &str, cmd: impl Command + 'static) {
        self.commands.insert(name.to_string(), Arc::new(cmd));
    }

    /// Parse and execute a RESP command in the given session
    pub async fn execute(&self, value: Value, session: &Session) -> Value {
        let items = match value {
            Value::Array(Some(items)) if !items.is_empty() => items,
            _ => return Value::error("ERR failed to parse command"),
        };

        // First item should be the command name
        let cmd_name = match &items[0] {
            Value::BulkString(Some(data)) => String::from_utf8_lossy(data).to_uppercase(),
            Value::SimpleString(s) => s.to_uppercase(),
            _ => return Value::error("ERR invalid command format"),
        };

        match self.commands.get(&cmd_name) {
            Some(cmd) => {
                debug!("Executing {} for {}", cmd_name, session.identity);
                cmd.execute(&items, session).await
            }
            None => Value::error(format!("ERR unknown command '{}'", cmd_name)),
        }
    }
}
