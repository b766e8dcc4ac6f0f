use std::path::PathBuf;
use std::str::FromStr;

use configparser::ini::Ini;
use thiserror::Error;

use crate::store::{Product, Slot};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config '{path}': {reason}")]
  Read { path: String, reason: String },
  #[error("failed to parse config: {0}")]
  Parse(String),
  #[error("invalid value for [{section}] {key}: {reason}")]
  InvalidValue {
    section: &'static str,
    key: String,
    reason: String,
  },
  #[error("product '{0}' is listed in [catalog] but has no entry in [products]")]
  MissingProduct(String),
  #[error("duplicate product id '{0}'")]
  DuplicateProduct(String),
}

/// Log configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
  /// Log file path, if not set, logs will be printed to stdout
  pub file: Option<String>,
  /// Log level, default is "info"
  pub level: String,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      file: None,
      level: "info".to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
  /// Listening address (Redis protocol)
  pub addr: String,
  /// Service name reported by STATUS
  pub name: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      addr: "0.0.0.0:6379".to_string(),
      name: "slotdb".to_string(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
  Memory,
  File,
  #[cfg(feature = "rocksdb")]
  RocksDb,
}

impl FromStr for Backend {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "memory" => Ok(Backend::Memory),
      "file" => Ok(Backend::File),
      #[cfg(feature = "rocksdb")]
      "rocksdb" => Ok(Backend::RocksDb),
      other => Err(format!("unsupported backend '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
  pub backend: Backend,
  /// Snapshot file or database directory, unused by the memory backend
  pub path: PathBuf,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      backend: Backend::Memory,
      path: PathBuf::from("data/slotdb"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogConfig {
  pub home_page: String,
  /// Products in listing order
  pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OracleConfig {
  /// Price served until the first update
  pub initial_price: f64,
}

/// SlotDB configuration
///
/// Read from an INI file:
///
/// ```ini
/// [server]
/// addr = 0.0.0.0:6379
/// name = slotdb
///
/// [log]
/// level = info
/// file = /var/log/slotdb.log
///
/// [storage]
/// backend = file
/// path = data/slotdb.json
///
/// [slots]
/// book = The Grain Book
///
/// [oracle]
/// price = 4.2
///
/// [catalog]
/// home_page = Welcome
/// products = seed, loaf
///
/// [products]
/// seed = Heirloom seed pack
/// loaf = Sourdough loaf
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
  pub server: ServerConfig,
  pub log: LogConfig,
  pub storage: StorageConfig,
  /// Initial slot values
  pub slots: Vec<(Slot, String)>,
  pub oracle: OracleConfig,
  pub catalog: CatalogConfig,
}

impl Config {
  /// Load configuration from INI file
  pub fn from_file(path: &str) -> Result<Self, ConfigError> {
    let mut ini = Ini::new_cs();
    ini.load(path).map_err(|reason| ConfigError::Read {
      path: path.to_string(),
      reason,
    })?;
    Self::from_ini(&ini)
  }

  pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
    let mut ini = Ini::new_cs();
    ini.read(text.to_string()).map_err(ConfigError::Parse)?;
    Self::from_ini(&ini)
  }

  fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
    let mut config = Config::default();

    if let Some(addr) = ini.get("server", "addr") {
      config.server.addr = addr;
    }
    if let Some(name) = ini.get("server", "name") {
      config.server.name = name;
    }

    if let Some(level) = ini.get("log", "level") {
      config.log.level = level;
    }
    config.log.file = ini.get("log", "file").filter(|f| !f.is_empty());

    if let Some(backend) = ini.get("storage", "backend") {
      config.storage.backend = backend
        .parse()
        .map_err(|reason| ConfigError::InvalidValue {
          section: "storage",
          key: "backend".to_string(),
          reason,
        })?;
    }
    if let Some(path) = ini.get("storage", "path") {
      config.storage.path = PathBuf::from(path);
    }

    let sections = ini.get_map_ref();
    if let Some(slots) = sections.get("slots") {
      for (name, value) in slots {
        let slot = name
          .parse::<Slot>()
          .map_err(|e| ConfigError::InvalidValue {
            section: "slots",
            key: name.clone(),
            reason: e.to_string(),
          })?;
        config
          .slots
          .push((slot, value.clone().unwrap_or_default()));
      }
      config.slots.sort_by_key(|(slot, _)| *slot);
    }

    if let Some(price) = ini.get("oracle", "price") {
      let invalid = |reason: String| ConfigError::InvalidValue {
        section: "oracle",
        key: "price".to_string(),
        reason,
      };
      let value = price
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(e.to_string()))?;
      if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("{} is not a non-negative number", value)));
      }
      config.oracle.initial_price = value;
    }

    if let Some(home_page) = ini.get("catalog", "home_page") {
      config.catalog.home_page = home_page;
    }
    if let Some(list) = ini.get("catalog", "products") {
      let descriptions = sections.get("products");
      let mut seen = Vec::new();
      for id in list.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if seen.contains(&id) {
          return Err(ConfigError::DuplicateProduct(id.to_string()));
        }
        seen.push(id);

        let description = descriptions
          .and_then(|products| products.get(id))
          .and_then(|d| d.clone())
          .ok_or_else(|| ConfigError::MissingProduct(id.to_string()))?;
        config.catalog.products.push(Product::new(id, description));
      }
    }

    Ok(config)
  }
}
