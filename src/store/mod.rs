//! Keyed state store
//!
//! [`Service`] is what the transport talks to. It owns the named text
//! slots, the price oracle, the product catalog and the persistence
//! backend they write through.

mod catalog;
mod oracle;
mod resource;
mod slot;

pub use catalog::{Catalog, Product};
pub use oracle::{PriceOracle, PriceRecord};
pub use resource::ResourceStore;
pub use slot::Slot;

use std::sync::Arc;

use derive_more::{Display, From};
use tracing::info;

use crate::config::Config;
use crate::error::StartupError;
use crate::persist::{self, PersistError, Persistence};
use crate::util::time::Clock;

/// Opaque caller identity supplied by the transport
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub struct Identity(String);

pub struct Service {
    resources: ResourceStore,
    oracle: PriceOracle,
    catalog: Catalog,
    persistence: Arc<dyn Persistence>,
    status: String,
}

impl Service {
    /// Open the configured backend and build the service on top of it
    pub fn open(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, StartupError> {
        let persistence = persist::open(&config.storage)?;
        let catalog = Catalog::new(
            config.catalog.home_page.clone(),
            config.catalog.products.clone(),
        )?;
        let service = Self::from_parts(
            &config.server.name,
            config.slots.clone(),
            config.oracle.initial_price,
            catalog,
            clock,
            persistence,
        )?;
        Ok(service)
    }

    pub fn from_parts(
        name: &str,
        slots: Vec<(Slot, String)>,
        initial_price: f64,
        catalog: Catalog,
        clock: Arc<dyn Clock>,
        persistence: Arc<dyn Persistence>,
    ) -> Result<Self, PersistError> {
        let resources = ResourceStore::open(slots, persistence.clone())?;
        let oracle = PriceOracle::open(initial_price, clock, persistence.clone())?;

        // Everything in the status line is fixed from here on.
        let status = format!(
            "{} v{} running: {} slots, {} products, {} storage",
            name,
            env!("CARGO_PKG_VERSION"),
            Slot::COUNT,
            catalog.len(),
            persistence.name()
        );
        info!("Service ready: {}", status);

        Ok(Self {
            resources,
            oracle,
            catalog,
            persistence,
            status,
        })
    }

    pub fn status(&self) -> String {
        self.status.clone()
    }

    /// Echo the identity the transport attached to the call
    pub fn whoami(&self, caller: &Identity) -> Identity {
        caller.clone()
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    pub fn oracle(&self) -> &PriceOracle {
        &self.oracle
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Flush the backend before the process exits
    pub fn shutdown(&self) -> Result<(), PersistError> {
        info!("Flushing {} storage", self.persistence.name());
        self.persistence.flush()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::service;
    use super::*;
    use crate::util::time::testing::ManualClock;

    #[test]
    fn test_status_is_constant() {
        let service = service(Arc::new(ManualClock::at(1)));
        let before = service.status();
        assert!(!before.is_empty());
        assert!(before.contains("5 slots, 2 products, memory storage"));

        service.resources().update("book", "changed".to_string()).unwrap();
        service.oracle().update_price(3.0).unwrap();
        assert_eq!(service.status(), before);
    }

    #[test]
    fn test_whoami_echoes_caller() {
        let service = service(Arc::new(ManualClock::at(1)));
        let caller = Identity::from("127.0.0.1:5000".to_string());
        assert_eq!(service.whoami(&caller), caller);
        assert_eq!(caller.to_string(), "127.0.0.1:5000");
    }

    #[test]
    fn test_configured_slot_value() {
        let service = service(Arc::new(ManualClock::at(1)));
        assert_eq!(service.resources().get("book").unwrap(), "The Grain Book");
    }

    #[test]
    fn test_open_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let ini = format!(
            "[storage]\nbackend = file\npath = {}\n\n[catalog]\nproducts = a\n\n[products]\na = Apple\n",
            path.display()
        );
        let config = Config::from_ini_str(&ini).unwrap();
        let clock = Arc::new(ManualClock::at(77));

        let service = Service::open(&config, clock.clone()).unwrap();
        service.resources().update("time", "noon".to_string()).unwrap();
        service.oracle().update_price(8.0).unwrap();
        service.shutdown().unwrap();
        drop(service);

        let reopened = Service::open(&config, clock).unwrap();
        assert_eq!(reopened.resources().get("time").unwrap(), "noon");
        assert_eq!(
            reopened.oracle().record(),
            PriceRecord { value: 8.0, last_updated: 77 }
        );
        assert_eq!(reopened.catalog().product("a").unwrap(), "Apple");
    }
}
