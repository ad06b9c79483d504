//! SharePoint storage backend
//!
//! The adapter implementation: single-object operations, folder listing,
//! streamed uploads and downloads.

pub mod adapter;
mod listing;
mod stream;
mod upload;

pub use adapter::SharepointAdapter;
