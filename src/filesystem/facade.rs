//! Filesystem facade
//!
//! Backend-independent entry point: normalizes paths, forwards every verb
//! to the mounted adapter and dispatches registered plugins.

use bytes::Bytes;
use log::debug;
use std::collections::HashMap;

use crate::error::StorageError;
use crate::filesystem::adapter::{Adapter, ByteSource, ReadStream};
use crate::filesystem::entry::FileEntry;
use crate::filesystem::plugin::{GET_URL, Plugin};
use crate::path::normalize;

pub struct Filesystem {
    adapter: Box<dyn Adapter>,
    plugins: HashMap<&'static str, Box<dyn Plugin>>,
}

impl Filesystem {
    pub fn new(adapter: impl Adapter + 'static) -> Self {
        Self {
            adapter: Box::new(adapter),
            plugins: HashMap::new(),
        }
    }

    /// The mounted adapter, for backend-specific calls
    pub fn adapter(&self) -> &dyn Adapter {
        self.adapter.as_ref()
    }

    /// Register a plugin; a later plugin with the same method name wins.
    pub fn add_plugin(&mut self, plugin: Box<dyn Plugin>) -> &mut Self {
        debug!("Registering plugin {}", plugin.method());
        self.plugins.insert(plugin.method(), plugin);
        self
    }

    /// Invoke a registered plugin by method name
    pub async fn call_plugin(&self, method: &str, path: &str) -> Result<String, StorageError> {
        let plugin = self.plugins.get(method).ok_or_else(|| {
            StorageError::Unsupported(format!("plugin {} is not registered", method))
        })?;
        let path = normalize(path)?;
        plugin.handle(self.adapter.as_ref(), &path).await
    }

    /// URL for a stored object through the `GetUrl` plugin
    pub async fn get_url(&self, path: &str) -> Result<String, StorageError> {
        self.call_plugin(GET_URL, path).await
    }

    pub async fn write(
        &self,
        path: &str,
        contents: impl AsRef<[u8]>,
    ) -> Result<FileEntry, StorageError> {
        let path = normalize(path)?;
        self.adapter.write(&path, contents.as_ref()).await
    }

    pub async fn write_stream(
        &self,
        path: &str,
        stream: &mut ByteSource<'_>,
    ) -> Result<FileEntry, StorageError> {
        let path = normalize(path)?;
        self.adapter.write_stream(&path, stream).await
    }

    pub async fn update(
        &self,
        path: &str,
        contents: impl AsRef<[u8]>,
    ) -> Result<FileEntry, StorageError> {
        let path = normalize(path)?;
        self.adapter.update(&path, contents.as_ref()).await
    }

    pub async fn read(&self, path: &str) -> Result<Bytes, StorageError> {
        let path = normalize(path)?;
        self.adapter.read(&path).await
    }

    pub async fn read_stream(&self, path: &str) -> Result<Box<dyn ReadStream>, StorageError> {
        let path = normalize(path)?;
        self.adapter.read_stream(&path).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let path = normalize(path)?;
        self.adapter.delete(&path).await
    }

    pub async fn delete_dir(&self, path: &str) -> Result<(), StorageError> {
        let path = normalize(path)?;
        if path.is_empty() {
            return Err(StorageError::InvalidPath(
                "refusing to delete the root directory".into(),
            ));
        }
        self.adapter.delete_dir(&path).await
    }

    pub async fn create_dir(&self, path: &str) -> Result<FileEntry, StorageError> {
        let path = normalize(path)?;
        self.adapter.create_dir(&path).await
    }

    /// The root itself is never reported as an entry, so `has("")` is
    /// `false` just as the root never shows up in a listing.
    pub async fn has(&self, path: &str) -> Result<bool, StorageError> {
        let path = normalize(path)?;
        if path.is_empty() {
            return Ok(false);
        }
        self.adapter.has(&path).await
    }

    /// Entries below `directory`; entries the adapter reports outside the
    /// requested scope are dropped.
    pub async fn list_contents(
        &self,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<FileEntry>, StorageError> {
        let directory = normalize(directory)?;
        let mut entries = self.adapter.list_contents(&directory, recursive).await?;
        entries.retain(|entry| in_scope(&directory, entry, recursive));
        Ok(entries)
    }

    pub async fn get_metadata(&self, path: &str) -> Result<FileEntry, StorageError> {
        let path = normalize(path)?;
        self.adapter.get_metadata(&path).await
    }

    pub async fn get_timestamp(&self, path: &str) -> Result<i64, StorageError> {
        let path = normalize(path)?;
        self.adapter.get_timestamp(&path).await
    }

    pub async fn get_size(&self, path: &str) -> Result<u64, StorageError> {
        let path = normalize(path)?;
        self.adapter.get_size(&path).await
    }

    pub async fn get_mimetype(&self, path: &str) -> Result<Option<String>, StorageError> {
        let path = normalize(path)?;
        self.adapter.get_mimetype(&path).await
    }

    pub async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let (from, to) = (normalize(from)?, normalize(to)?);
        self.adapter.rename(&from, &to).await
    }

    pub async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let (from, to) = (normalize(from)?, normalize(to)?);
        self.adapter.copy(&from, &to).await
    }
}

fn in_scope(directory: &str, entry: &FileEntry, recursive: bool) -> bool {
    if recursive {
        if directory.is_empty() {
            return !entry.path.is_empty();
        }
        entry.path.len() > directory.len() + 1
            && entry.path.as_bytes()[..directory.len()].eq_ignore_ascii_case(directory.as_bytes())
            && entry.path.as_bytes()[directory.len()] == b'/'
    } else {
        entry.dirname.eq_ignore_ascii_case(directory)
    }
}
