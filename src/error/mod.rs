//! Error handling
//!
//! Defines error types and response classification for the adapter.

pub mod handlers;
pub mod types;

pub use handlers::{classify_response, report};
pub use types::*;
