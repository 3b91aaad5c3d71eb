//! Error taxonomy shared across layers
//!
//! Lower layers return these tagged values; the app layer alone decides how
//! each one is presented. Nothing here is retried automatically.

use thiserror::Error;

/// Startup configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to determine a home directory")]
    NoHomeDir,
}

/// User-correctable input problems, shown inline and never logged as failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL is empty")]
    EmptyUrl,
    #[error("URL is missing a scheme (http:// or https://)")]
    MissingScheme,
    #[error("URL is missing a host")]
    MissingHost,
    #[error("query is empty")]
    EmptyQuery,
    #[error("name must not be empty")]
    EmptyName,
}

/// Outbound HTTP failures, recorded in history with the error field set
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpError {
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Other(String),
}

/// Database failures, recorded in query history
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("not connected to a database")]
    NotConnected,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("connection lost: {0}")]
    ConnectionLost(String),
    #[error("query failed: {0}")]
    Query(String),
}

/// Load/save/migrate failures; the app degrades to in-memory-only operation
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported document version {0:?}")]
    UnsupportedVersion(String),
}
