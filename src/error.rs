//! Error types.
//!
//! This module provides the `Error` and `Result` types that are used
//! for handling errors throughout the crate.

use std::io;

use thiserror::Error;

/// `Result` type alias for operations that can lead to errors.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Errors in reading, writing, or using embeddings and helper files.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid file format.
    #[error("{0}")]
    Format(String),

    /// I/O error.
    #[error("{desc}: {error}")]
    Io {
        desc: String,
        #[source]
        error: io::Error,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV/TSV reading or writing error.
    #[error("Delimited text error: {0}")]
    Csv(#[from] csv::Error),

    /// Binary object (de)serialization error.
    #[error("Binary serialization error: {0}")]
    Binary(#[from] bincode::Error),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn io_error(desc: impl Into<String>, error: io::Error) -> Self {
        Error::Io {
            desc: desc.into(),
            error,
        }
    }
}
