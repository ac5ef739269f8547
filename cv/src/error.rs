//! Error types for configuration, open, and per-request I/O

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while the host passes parameters
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown parameter: {key}")]
    UnknownParameter { key: String },

    #[error("{key} parameter is required")]
    MissingParameter { key: String },

    #[error("invalid path '{value}'")]
    InvalidPath {
        value: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort opening a device
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("device opened before configuration was completed")]
    NotConfigured,

    #[error("failed to read chunk directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid chunk name '{name}': expected a hexadecimal offset")]
    InvalidChunkName { name: String },

    #[error("chunks '{first}' and '{second}' both start at offset {offset:#x}")]
    DuplicateOffset { offset: u64, first: String, second: String },
}

/// Why the metadata file could not supply a volume size
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata file not found")]
    NotFound,

    #[error("failed to read metadata file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("field '{field}' missing from metadata")]
    MissingField { field: &'static str },

    #[error("field '{field}' is not a non-negative integer: '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("volume size overflows: {block_size} x {blocks_total}")]
    Overflow { block_size: u64, blocks_total: u64 },
}

/// Errors returned by per-request device operations
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no data at offset {offset:#x}")]
    NoData { offset: u64 },

    #[error("I/O error on chunk {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writes are not supported")]
    WriteNotSupported,
}

impl DeviceError {
    /// Check if the request hit a hole rather than failing
    pub fn is_no_data(&self) -> bool {
        matches!(self, DeviceError::NoData { .. })
    }
}
