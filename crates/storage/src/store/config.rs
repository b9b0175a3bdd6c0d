#![forbid(unsafe_code)]

use super::StoreError;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const STORAGE_DIR_ENV: &str = "DOCTREE_STORAGE_DIR";
pub const DB_FILE_ENV: &str = "DOCTREE_DB_FILE";
pub const BUSY_TIMEOUT_ENV: &str = "DOCTREE_BUSY_TIMEOUT_MS";
pub const MAX_TREE_DEPTH_ENV: &str = "DOCTREE_MAX_TREE_DEPTH";

const DEFAULT_DB_FILE: &str = "documents.db";
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_MAX_TREE_DEPTH: usize = 128;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_dir: PathBuf,
    pub db_file_name: String,
    pub busy_timeout: Duration,
    /// Deepest `level` a document may reach; also bounds ancestor walks.
    pub max_tree_depth: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("."),
            db_file_name: DEFAULT_DB_FILE.to_string(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }
}

impl StoreConfig {
    pub fn new(storage_dir: impl AsRef<Path>) -> Self {
        Self {
            storage_dir: storage_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_db_file_name(mut self, name: impl Into<String>) -> Self {
        self.db_file_name = name.into();
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn with_max_tree_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = depth;
        self
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage_dir.join(&self.db_file_name)
    }

    /// Reads overrides from the process environment; unset variables keep defaults.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let mut config = Self::default();

        if let Some(dir) = lookup(STORAGE_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            config.storage_dir = PathBuf::from(dir.trim());
        }
        if let Some(name) = lookup(DB_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            config.db_file_name = name.trim().to_string();
        }
        if let Some(raw) = lookup(BUSY_TIMEOUT_ENV) {
            let ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| StoreError::InvalidInput("DOCTREE_BUSY_TIMEOUT_MS must be an integer"))?;
            config.busy_timeout = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup(MAX_TREE_DEPTH_ENV) {
            let depth = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|depth| *depth > 0)
                .ok_or(StoreError::InvalidInput(
                    "DOCTREE_MAX_TREE_DEPTH must be a positive integer",
                ))?;
            config.max_tree_depth = depth;
        }

        Ok(config)
    }
}
