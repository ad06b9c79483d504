//! Generic filesystem abstraction
//!
//! The adapter contract, the entry record, the facade callers use and the
//! plugin mechanism it dispatches.

pub mod adapter;
pub mod entry;
pub mod facade;
pub mod plugin;

pub use adapter::{Adapter, ByteSource, ReadStream, UrlGenerator};
pub use entry::{EntryKind, FileEntry};
pub use facade::Filesystem;
pub use plugin::{GET_URL, GetUrl, Plugin};
