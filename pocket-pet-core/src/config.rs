//! Configuration for the Pocket Pet engine.
//!
//! This module provides the `Config` struct with a builder pattern for the
//! storage location, decay cadence, and the defaults used when a pet is
//! reinitialized.

use crate::codec::STORAGE_KEY;
use crate::error::{Error, Result};
use crate::pet::{DEFAULT_APPEARANCE, DEFAULT_NAME};
use crate::storage::FileStorage;
use std::path::PathBuf;
use std::time::Duration;

/// Default directory for slot files.
const DEFAULT_DATA_DIR: &str = ".pocket-pet";

/// Default time between decay ticks in seconds.
const DEFAULT_DECAY_INTERVAL_SECS: u64 = 10;

/// Configuration for a Pocket Pet host.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory where the pet slot file lives.
    pub data_dir: PathBuf,

    /// Name of the slot holding the pet state.
    pub storage_key: String,

    /// Time between decay ticks.
    pub decay_interval: Duration,

    /// Name given to a reinitialized pet.
    pub default_name: String,

    /// Appearance given to a reinitialized pet.
    pub default_appearance: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_key: STORAGE_KEY.to_string(),
            decay_interval: Duration::from_secs(DEFAULT_DECAY_INTERVAL_SECS),
            default_name: DEFAULT_NAME.to_string(),
            default_appearance: DEFAULT_APPEARANCE.to_string(),
        }
    }
}

impl Config {
    /// Create a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the storage slot name.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the time between decay ticks.
    pub fn decay_interval(mut self, interval: Duration) -> Self {
        self.decay_interval = interval;
        self
    }

    /// Set the time between decay ticks in seconds.
    pub fn decay_interval_secs(mut self, secs: u64) -> Self {
        self.decay_interval = Duration::from_secs(secs);
        self
    }

    /// Set the name used by `reinitialize()`.
    pub fn default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    /// Set the appearance used by `reinitialize()`.
    pub fn default_appearance(mut self, appearance: impl Into<String>) -> Self {
        self.default_appearance = appearance.into();
        self
    }

    /// Check the configuration for values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for a zero decay interval or an empty
    /// storage key.
    pub fn validate(&self) -> Result<()> {
        if self.decay_interval.is_zero() {
            return Err(Error::config_error("decay interval must be non-zero"));
        }
        if self.storage_key.trim().is_empty() {
            return Err(Error::config_error("storage key must not be empty"));
        }
        Ok(())
    }

    /// File-backed storage rooted at `data_dir`.
    pub fn file_storage(&self) -> FileStorage {
        FileStorage::new(&self.data_dir)
    }
}
