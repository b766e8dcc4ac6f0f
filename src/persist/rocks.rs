//! RocksDB backend, enabled with the `rocksdb` feature

use std::path::Path;

use rocksdb::{DB, Options, WriteOptions};

use super::{PersistError, Persistence};

impl From<rocksdb::Error> for PersistError {
    fn from(e: rocksdb::Error) -> Self {
        PersistError::Backend(e.into_string())
    }
}

pub struct RocksBackend {
    db: DB,
}

impl RocksBackend {
    pub fn open(path: &Path) -> Result<Self, PersistError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db })
    }
}

impl Persistence for RocksBackend {
    fn name(&self) -> &'static str {
        "rocksdb"
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        Ok(self.db.get(key.as_bytes())?)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), PersistError> {
        let mut opts = WriteOptions::default();
        opts.set_sync(true);
        self.db.put_opt(key.as_bytes(), value, &opts)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), PersistError> {
        self.db.flush()?;
        Ok(())
    }
}
