//! Error types for the Pocket Pet engine.
//!
//! Commands against a missing pet are not errors; they report
//! [`Outcome::NoPet`](crate::store::Outcome::NoPet). Everything here is about
//! the durable slot, the codec, and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pocket-pet-core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a storage slot from disk.
    #[error("failed to read storage slot '{path}': {source}")]
    StorageRead {
        /// The file backing the slot.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a storage slot on disk.
    #[error("failed to write storage slot '{path}': {source}")]
    StorageWrite {
        /// The file backing the slot.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the pet state.
    #[error("failed to encode pet state: {source}")]
    Encode {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Stored data is not valid JSON or does not match the persisted layout.
    #[error("failed to decode pet state: {source}")]
    Decode {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Stored data parsed but violates a pet invariant.
    #[error("invalid stored pet: {message}")]
    InvalidPet {
        /// Which invariant was violated.
        message: String,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem.
        message: String,
    },
}

impl Error {
    /// Create a new `InvalidPet` error with the given message.
    pub fn invalid_pet(message: impl Into<String>) -> Self {
        Self::InvalidPet {
            message: message.into(),
        }
    }

    /// Create a new `ConfigError` with the given message.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

/// A specialized `Result` type for pocket-pet-core operations.
pub type Result<T> = std::result::Result<T, Error>;
