//! SharePoint REST plumbing
//!
//! The HTTP client, endpoint paths and response models the adapter talks
//! to the service with.

pub mod client;
pub mod endpoints;
pub mod models;

pub use client::{Params, RestClient};
pub use models::{FileProps, FolderProps};
