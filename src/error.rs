//! Error types for riftbound_sync

use std::fmt;

/// Unified error type for worker operations
#[derive(Debug)]
pub enum SyncError {
    /// HTTP request failed (network error, timeout, etc.)
    Network(reqwest::Error),
    /// Failed to parse JSON payload
    Parse(serde_json::Error),
    /// HTTP error status code
    HttpStatus(reqwest::StatusCode),
    /// Page fetched but the embedded payload or card list is missing
    SourceFormat(String),
    /// Missing or invalid publish-target configuration
    Config(String),
    /// Object storage operation failed
    Storage(String),
    /// File I/O error
    Io(std::io::Error),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Network(e) => write!(f, "Network error: {}", e),
            SyncError::Parse(e) => write!(f, "Parse error: {}", e),
            SyncError::HttpStatus(status) => write!(f, "HTTP error: {}", status),
            SyncError::SourceFormat(msg) => write!(f, "Source format error: {}", msg),
            SyncError::Config(msg) => write!(f, "Configuration error: {}", msg),
            SyncError::Storage(msg) => write!(f, "Storage error: {}", msg),
            SyncError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Network(e) => Some(e),
            SyncError::Parse(e) => Some(e),
            SyncError::Io(e) => Some(e),
            SyncError::HttpStatus(_)
            | SyncError::SourceFormat(_)
            | SyncError::Config(_)
            | SyncError::Storage(_) => None,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Network(err)
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Parse(err)
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err)
    }
}

/// Result alias for worker operations
pub type Result<T> = std::result::Result<T, SyncError>;
