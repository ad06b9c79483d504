//! SharePoint document library adapter for a generic filesystem facade.

pub mod config;
pub mod error;
pub mod filesystem;
pub mod path;
pub mod remote;
pub mod storage;

pub use crate::config::{AdapterConfig, Credentials};
pub use crate::error::{RemoteError, StorageError};
pub use crate::filesystem::{Adapter, EntryKind, FileEntry, Filesystem, GetUrl, Plugin};
pub use crate::storage::SharepointAdapter;
