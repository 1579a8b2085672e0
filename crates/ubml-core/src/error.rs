//! Error types for the UBML core engine
//!
//! Diagnostics (duplicate identifiers, dangling references, structure
//! advisories) are ordinary data carried in reports — see
//! [`crate::diagnostics`]. The [`Error`] enum below is reserved for
//! failures of the machinery itself: I/O, encoding, and engine
//! construction.
//!
//! Copyright (c) 2025 UBML Contributors
//! Licensed under the MIT OR Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Result type for UBML core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for UBML core operations
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O errors
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing errors raised outside the diagnostic pipeline,
    /// e.g. while reading the stats side-channel
    #[error("Failed to parse YAML in '{path}': {source}")]
    YamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A JSON Schema failed to compile
    #[error("Failed to compile schema for '{document_type}': {reason}")]
    SchemaCompile {
        document_type: String,
        reason: String,
    },

    /// Reading or writing the persisted identifier stats failed
    #[error("Identifier stats persistence failed for '{path}': {reason}")]
    StatsPersistence { path: PathBuf, reason: String },
}

impl Error {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a stats persistence error
    pub fn stats(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::StatsPersistence {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
