//! Configuration for tinytable
//!
//! Centralized configuration with sensible defaults. Passed explicitly to
//! every table constructor; there is no process-wide state.

use std::path::{Path, PathBuf};

/// Main configuration for opening and creating tables
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the table files. Must already exist.
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── {table}.config   (schema, JSON)
    ///     ├── {table}.table    (row data)
    ///     └── {table}.index    (dynamic tables only)
    pub data_dir: PathBuf,

    /// Permission bits for newly created files (Unix only)
    pub file_mode: u32,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// How every mutating operation is flushed before returning
    pub sync_strategy: SyncStrategy,
}

/// Sync strategy applied after every write, update and delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync data and metadata (`File::sync_all`)
    Full,

    /// fdatasync, skipping metadata that is not needed to read the data back
    DataOnly,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./tinytable_data"),
            file_mode: 0o644,
            sync_strategy: SyncStrategy::Full,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve the file paths of the table called `name`
    pub fn table_paths(&self, name: &str) -> TablePaths {
        TablePaths::new(&self.data_dir, name)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the permission bits for created files
    pub fn file_mode(mut self, mode: u32) -> Self {
        self.config.file_mode = mode;
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Locations of the files that make up one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    pub config: PathBuf,
    pub data: PathBuf,
    pub index: PathBuf,
}

impl TablePaths {
    const CONFIG_EXT: &'static str = "config";
    const DATA_EXT: &'static str = "table";
    const INDEX_EXT: &'static str = "index";

    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            config: dir.join(format!("{}.{}", name, Self::CONFIG_EXT)),
            data: dir.join(format!("{}.{}", name, Self::DATA_EXT)),
            index: dir.join(format!("{}.{}", name, Self::INDEX_EXT)),
        }
    }
}
