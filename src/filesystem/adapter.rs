//! Adapter contract
//!
//! The method set every storage backend implements so it can be mounted in
//! a [`Filesystem`](crate::filesystem::Filesystem). Paths handed to an
//! adapter are logical paths relative to the adapter's own root.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::error::StorageError;
use crate::filesystem::entry::FileEntry;

/// Byte source for streamed writes
pub type ByteSource<'a> = dyn AsyncRead + Unpin + Send + 'a;

/// Incremental reader over a stored file's content
#[async_trait]
pub trait ReadStream: Send {
    /// Next piece of content, `None` once the body is exhausted
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, StorageError>;
}

/// Backends that can hand out a URL for a stored object
pub trait UrlGenerator: Send + Sync {
    fn url(&self, path: &str) -> Result<String, StorageError>;
}

#[async_trait]
pub trait Adapter: Send + Sync {
    /// Create or overwrite a file.
    async fn write(&self, path: &str, contents: &[u8]) -> Result<FileEntry, StorageError>;

    /// Create or overwrite a file from a byte stream.
    async fn write_stream(
        &self,
        path: &str,
        stream: &mut ByteSource<'_>,
    ) -> Result<FileEntry, StorageError>;

    /// Overwrite an existing file.
    async fn update(&self, path: &str, contents: &[u8]) -> Result<FileEntry, StorageError>;

    async fn read(&self, path: &str) -> Result<Bytes, StorageError>;

    async fn read_stream(&self, path: &str) -> Result<Box<dyn ReadStream>, StorageError>;

    /// Remove a file or an empty directory.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Remove a directory and everything below it.
    async fn delete_dir(&self, path: &str) -> Result<(), StorageError>;

    /// Create a directory; succeeds if it already exists.
    async fn create_dir(&self, path: &str) -> Result<FileEntry, StorageError>;

    /// Whether a file or directory exists at `path`. The root is not an
    /// entry of itself: [`Filesystem::has`](crate::filesystem::Filesystem::has)
    /// answers `false` for it without asking the adapter.
    async fn has(&self, path: &str) -> Result<bool, StorageError>;

    /// Entries below `path`. A missing directory lists as empty.
    async fn list_contents(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<Vec<FileEntry>, StorageError>;

    async fn get_metadata(&self, path: &str) -> Result<FileEntry, StorageError>;

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError>;

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError>;

    async fn get_timestamp(&self, path: &str) -> Result<i64, StorageError> {
        let entry = self.get_metadata(path).await?;
        entry.timestamp.ok_or_else(|| {
            StorageError::Unsupported(format!("no modification time for {}", entry.path))
        })
    }

    async fn get_size(&self, path: &str) -> Result<u64, StorageError> {
        let entry = self.get_metadata(path).await?;
        if entry.is_dir() {
            return Err(StorageError::NotAFile(entry.path));
        }
        entry
            .size
            .ok_or_else(|| StorageError::Unsupported(format!("no size for {}", entry.path)))
    }

    /// `Ok(None)` means the object exists but its content type is unknown.
    async fn get_mimetype(&self, path: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get_metadata(path).await?.mimetype)
    }

    fn url_generator(&self) -> Option<&dyn UrlGenerator> {
        None
    }
}
