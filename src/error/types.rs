//! Error types
//!
//! Defines the storage-level error taxonomy surfaced to filesystem callers
//! and the remote-level errors produced while talking to SharePoint.

use std::fmt;
use std::io;

/// Errors raised by the REST transport or the remote service itself
#[derive(Debug)]
pub enum RemoteError {
    Transport(reqwest::Error),
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },
    Decode(String),
    UploadRejected {
        expected_offset: u64,
        reported_offset: u64,
    },
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Transport(e) => write!(f, "Transport error: {}", e),
            RemoteError::Status {
                status,
                code: Some(code),
                message,
            } => write!(f, "HTTP {} ({}): {}", status, code, message),
            RemoteError::Status {
                status, message, ..
            } => write!(f, "HTTP {}: {}", status, message),
            RemoteError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
            RemoteError::UploadRejected {
                expected_offset,
                reported_offset,
            } => write!(
                f,
                "Upload session out of step: expected offset {}, service reported {}",
                expected_offset, reported_offset
            ),
        }
    }
}

impl std::error::Error for RemoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RemoteError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        RemoteError::Transport(error)
    }
}

/// Errors surfaced by adapter and facade operations
#[derive(Debug)]
pub enum StorageError {
    NotFound(String),
    NotAFile(String),
    NotADirectory(String),
    DirectoryNotEmpty(String),
    InvalidPath(String),
    Unsupported(String),
    Config(config::ConfigError),
    Io(io::Error),
    Remote(RemoteError),
}

impl StorageError {
    /// True when the object addressed by the operation does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(p) => write!(f, "Not found: {}", p),
            StorageError::NotAFile(p) => write!(f, "Not a file: {}", p),
            StorageError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            StorageError::DirectoryNotEmpty(p) => write!(f, "Directory not empty: {}", p),
            StorageError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            StorageError::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
            StorageError::Config(e) => write!(f, "Configuration error: {}", e),
            StorageError::Io(e) => write!(f, "IO error: {}", e),
            StorageError::Remote(e) => write!(f, "Remote request failed: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Config(e) => Some(e),
            StorageError::Io(e) => Some(e),
            StorageError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::Io(error)
    }
}

impl From<config::ConfigError> for StorageError {
    fn from(error: config::ConfigError) -> Self {
        StorageError::Config(error)
    }
}

impl From<RemoteError> for StorageError {
    fn from(error: RemoteError) -> Self {
        StorageError::Remote(error)
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(error: reqwest::Error) -> Self {
        StorageError::Remote(RemoteError::Transport(error))
    }
}
