#![forbid(unsafe_code)]

mod blocks;
mod config;
mod documents;
mod error;
mod requests;
mod schema;
mod support;
mod trash;
mod tree;

pub use config::*;
pub use error::StoreError;
pub use requests::*;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use support::*;

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    config: StoreConfig,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_config(StoreConfig::new(storage_dir))
    }

    pub fn open_with_config(config: StoreConfig) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&config.storage_dir)?;

        let conn = Connection::open(config.db_path())?;
        conn.busy_timeout(config.busy_timeout)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;\n\
             PRAGMA synchronous = NORMAL;\n\
             PRAGMA foreign_keys = ON;",
        )?;

        Self::init(conn, config)
    }

    /// Private database that lives as long as the store; storage_dir is unused.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::init(conn, StoreConfig::default())
    }

    fn init(conn: Connection, config: StoreConfig) -> Result<Self, StoreError> {
        schema::preflight_gate(&conn)?;
        schema::install_schema(&conn)?;
        tracing::debug!(
            db = %config.db_path().display(),
            schema_version = schema::SCHEMA_VERSION,
            "document store opened"
        );
        Ok(Self { conn, config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn storage_dir(&self) -> &Path {
        &self.config.storage_dir
    }

    /// Runs `body` in an immediate write transaction named `op`.
    ///
    /// The transaction commits only when `body` succeeds. Any error drops it
    /// (rolling back every statement already issued) and SQLite failures are
    /// reported as `TransactionFailed`.
    fn write_tx<T>(
        &mut self,
        op: &'static str,
        body: impl FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| StoreError::from(err).in_transaction(op))?;

        match body(&tx) {
            Ok(value) => {
                tx.commit()
                    .map_err(|err| StoreError::from(err).in_transaction(op))?;
                Ok(value)
            }
            Err(err) => {
                drop(tx);
                let err = err.in_transaction(op);
                tracing::warn!(op, code = err.code(), error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }
}

pub(crate) fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

fn to_sqlite_i64(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidInput("numeric overflow"))
}
