//! Error handlers
//!
//! Classifies failed SharePoint responses and reports errors that callers
//! choose to swallow.

use crate::error::types::{RemoteError, StorageError};
use log::{error, warn};
use serde::Deserialize;

/// OData error codes SharePoint uses for a missing file or folder.
const NOT_FOUND_CODES: [&str; 2] = ["-2130575338", "-2147024894"];

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(rename = "odata.error", alias = "error")]
    error: ODataError,
}

#[derive(Debug, Deserialize)]
struct ODataError {
    code: Option<String>,
    message: Option<ODataMessage>,
}

#[derive(Debug, Deserialize)]
struct ODataMessage {
    value: Option<String>,
}

/// Convert a non-success response into the storage error taxonomy.
///
/// `target` is the logical path the request addressed; it becomes the
/// payload of `NotFound` so callers see their own path, not a server URL.
pub fn classify_response(status: u16, body: &[u8], target: &str) -> StorageError {
    let (code, message) = match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => (
            envelope.error.code,
            envelope
                .error
                .message
                .and_then(|m| m.value)
                .unwrap_or_default(),
        ),
        Err(_) => (None, String::from_utf8_lossy(body).trim().to_string()),
    };

    let code_says_missing = code
        .as_deref()
        .is_some_and(|c| NOT_FOUND_CODES.iter().any(|known| c.starts_with(known)));

    if status == 404 || code_says_missing {
        return StorageError::NotFound(target.to_string());
    }

    error!(
        "SharePoint request for {} failed with HTTP {}: {}",
        target, status, message
    );
    StorageError::Remote(RemoteError::Status {
        status,
        code,
        message,
    })
}

/// Log a failure that the caller is deliberately continuing past.
pub fn report(context: &str, err: &StorageError) {
    warn!("{} failed: {}", context, err);
}
