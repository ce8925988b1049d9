//! Error types for meterscan.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-probe network
//! failures are not errors at this level; see [`crate::discovery::ProbeFailure`].

use crate::types::{PortError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors a scan call can surface to its caller.
///
/// Only malformed input is fatal; everything that goes wrong on the
/// network or in the log store is absorbed by the engine.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("invalid address range: {0}")]
    InvalidRange(#[from] TargetError),

    #[error("invalid scan request: {0}")]
    InvalidRequest(String),
}

/// Device registry errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no template registered for {vendor} {model}")]
    UnknownTemplate { vendor: String, model: String },

    #[error("invalid bulk request: {0}")]
    InvalidBulk(String),

    #[error("registry unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read registry file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write registry file {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("registry serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Scan log storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage directory error: {0}")]
    DirectoryError(String),

    #[error("failed to save scan log: {0}")]
    SaveFailed(String),

    #[error("failed to load scan log: {0}")]
    LoadFailed(String),

    #[error("scan log not found: {0}")]
    ScanNotFound(String),

    #[error("log store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directories")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid configuration format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Top-level CLI errors.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid ports: {0}")]
    Port(#[from] PortError),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type EngineResult<T> = Result<T, DiscoveryError>;
pub type RegistryResult<T> = Result<T, RegistryError>;
pub type StorageResult<T> = Result<T, StorageError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type CliResult<T> = Result<T, CliError>;
