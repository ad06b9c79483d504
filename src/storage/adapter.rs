//! SharePoint adapter
//!
//! Maps filesystem verbs onto SharePoint REST calls. Whether a path is a
//! file or a folder is decided by which endpoint knows it, never by the
//! shape of the path string.

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info, warn};

use crate::config::AdapterConfig;
use crate::error::StorageError;
use crate::filesystem::{Adapter, ByteSource, FileEntry, ReadStream, UrlGenerator};
use crate::path::{PathTranslator, normalize};
use crate::remote::endpoints::{self, literal};
use crate::remote::models::parse_timestamp;
use crate::remote::{FileProps, FolderProps, RestClient};
use crate::storage::stream::ResponseStream;

/// What a path resolves to on the service
#[derive(Debug)]
pub(crate) enum RemoteObject {
    File(FileProps),
    Folder(FolderProps),
}

/// Adapter for one SharePoint document library
pub struct SharepointAdapter {
    pub(crate) client: RestClient,
    pub(crate) paths: PathTranslator,
    pub(crate) chunk_size: usize,
    pub(crate) upload_threshold: usize,
}

impl SharepointAdapter {
    pub fn new(config: &AdapterConfig) -> Result<Self, StorageError> {
        config.validate()?;
        let client = RestClient::new(config)?;
        let paths = PathTranslator::new(client.site_path(), &config.root)?;

        info!(
            "SharePoint adapter for {} rooted at {}",
            client.site_url(),
            paths.library_url()
        );

        Ok(Self {
            client,
            paths,
            chunk_size: config.chunk_size,
            upload_threshold: config.upload_threshold,
        })
    }

    /// Absolute URL of a stored object, computed without a request.
    pub fn get_url(&self, path: &str) -> Result<String, StorageError> {
        let server_relative = self.paths.to_server_relative(path)?;
        let mut url = self.client.site_url().clone();
        url.set_path(&server_relative);
        url.set_query(None);
        url.set_fragment(None);
        Ok(url.to_string())
    }

    pub(crate) fn file_entry(&self, path: String, props: &FileProps) -> FileEntry {
        FileEntry::file(
            path,
            props.length,
            props.time_last_modified.as_deref().and_then(parse_timestamp),
        )
    }

    pub(crate) fn folder_entry(&self, path: String, props: &FolderProps) -> FileEntry {
        FileEntry::dir(
            path,
            props.time_last_modified.as_deref().and_then(parse_timestamp),
        )
    }

    async fn file_props(&self, url: &str, path: &str) -> Result<Option<FileProps>, StorageError> {
        let params = [("@u", literal(url))];
        match self
            .client
            .get_json::<FileProps>(endpoints::FILE, &params, path)
            .await
        {
            Ok(props) if props.exists() => Ok(Some(props)),
            Ok(_) => Ok(None),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn folder_props(
        &self,
        url: &str,
        path: &str,
    ) -> Result<Option<FolderProps>, StorageError> {
        let params = [("@u", literal(url))];
        match self
            .client
            .get_json::<FolderProps>(endpoints::FOLDER, &params, path)
            .await
        {
            Ok(props) if props.exists() => Ok(Some(props)),
            Ok(_) => Ok(None),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolve a normalized path to the object it names.
    pub(crate) async fn stat(&self, path: &str) -> Result<RemoteObject, StorageError> {
        let url = self.paths.to_server_relative(path)?;

        if !path.is_empty() {
            if let Some(props) = self.file_props(&url, path).await? {
                return Ok(RemoteObject::File(props));
            }
        }

        match self.folder_props(&url, path).await? {
            Some(props) => Ok(RemoteObject::Folder(props)),
            None => Err(StorageError::NotFound(path.to_string())),
        }
    }

    /// Single-request upload into an existing folder.
    async fn upload(&self, path: &str, contents: Bytes) -> Result<FileProps, StorageError> {
        let (folder, name) = self.paths.split(path)?;
        let params = [("@u", literal(&folder)), ("@n", literal(&name))];
        self.client
            .post_json(endpoints::ADD_FILE, &params, contents, path)
            .await
    }

    /// Upload a whole file, creating missing parent folders on demand.
    pub(crate) async fn put(&self, path: &str, contents: Bytes) -> Result<FileEntry, StorageError> {
        let size = contents.len();
        let props = match self.upload(path, contents.clone()).await {
            Err(e) if e.is_not_found() => {
                info!("Parent folder of {} is missing, creating it", path);
                self.ensure_parents(path).await?;
                self.upload(path, contents).await?
            }
            other => other?,
        };

        info!("Wrote {} ({} bytes)", path, size);
        Ok(self.file_entry(path.to_string(), &props))
    }

    /// Create every missing folder above `path`, outermost first.
    pub(crate) async fn ensure_parents(&self, path: &str) -> Result<(), StorageError> {
        for ancestor in PathTranslator::ancestors(path)? {
            let url = self.paths.to_server_relative(&ancestor)?;
            if self.folder_props(&url, &ancestor).await?.is_none() {
                self.create_folder(&url, &ancestor).await?;
            }
        }
        Ok(())
    }

    async fn create_folder(&self, url: &str, path: &str) -> Result<FolderProps, StorageError> {
        info!("Creating folder {} ({})", path, url);
        let params = [("@u", literal(url))];
        self.client
            .post_json(endpoints::ADD_FOLDER, &params, Bytes::new(), path)
            .await
    }

    async fn folder_is_empty(&self, path: &str, props: &FolderProps) -> Result<bool, StorageError> {
        match props.item_count {
            Some(count) => Ok(count == 0),
            None => Ok(self.list_contents(path, false).await?.is_empty()),
        }
    }
}

#[async_trait]
impl Adapter for SharepointAdapter {
    async fn write(&self, path: &str, contents: &[u8]) -> Result<FileEntry, StorageError> {
        let path = normalize(path)?;
        self.put(&path, Bytes::copy_from_slice(contents)).await
    }

    async fn write_stream(
        &self,
        path: &str,
        stream: &mut ByteSource<'_>,
    ) -> Result<FileEntry, StorageError> {
        let path = normalize(path)?;
        self.put_stream(&path, stream).await
    }

    async fn update(&self, path: &str, contents: &[u8]) -> Result<FileEntry, StorageError> {
        let path = normalize(path)?;
        match self.stat(&path).await? {
            RemoteObject::File(_) => self.put(&path, Bytes::copy_from_slice(contents)).await,
            RemoteObject::Folder(_) => Err(StorageError::NotAFile(path)),
        }
    }

    async fn read(&self, path: &str) -> Result<Bytes, StorageError> {
        let path = normalize(path)?;
        let url = self.paths.to_server_relative(&path)?;
        let params = [("@u", literal(&url))];
        let contents = self
            .client
            .get_bytes(endpoints::FILE_CONTENT, &params, &path)
            .await?;
        debug!("Read {} ({} bytes)", path, contents.len());
        Ok(contents)
    }

    async fn read_stream(&self, path: &str) -> Result<Box<dyn ReadStream>, StorageError> {
        let path = normalize(path)?;
        let url = self.paths.to_server_relative(&path)?;
        let params = [("@u", literal(&url))];
        let response = self
            .client
            .get_raw(endpoints::FILE_CONTENT, &params, &path)
            .await?;
        Ok(Box::new(ResponseStream::new(response)))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let path = normalize(path)?;
        if path.is_empty() {
            return Err(StorageError::InvalidPath(
                "refusing to delete the library root".into(),
            ));
        }

        let url = self.paths.to_server_relative(&path)?;
        let params = [("@u", literal(&url))];
        match self.stat(&path).await? {
            RemoteObject::File(_) => {
                self.client.delete(endpoints::FILE, &params, &path).await?;
            }
            RemoteObject::Folder(props) => {
                if !self.folder_is_empty(&path, &props).await? {
                    warn!("Not deleting {}: folder still has items", path);
                    return Err(StorageError::DirectoryNotEmpty(path));
                }
                self.client.delete(endpoints::FOLDER, &params, &path).await?;
            }
        }

        info!("Deleted {}", path);
        Ok(())
    }

    async fn delete_dir(&self, path: &str) -> Result<(), StorageError> {
        let path = normalize(path)?;
        if path.is_empty() {
            return Err(StorageError::InvalidPath(
                "refusing to delete the library root".into(),
            ));
        }

        match self.stat(&path).await? {
            RemoteObject::File(_) => Err(StorageError::NotADirectory(path)),
            RemoteObject::Folder(_) => {
                let url = self.paths.to_server_relative(&path)?;
                let params = [("@u", literal(&url))];
                self.client.delete(endpoints::FOLDER, &params, &path).await?;
                info!("Deleted folder {} with its contents", path);
                Ok(())
            }
        }
    }

    async fn create_dir(&self, path: &str) -> Result<FileEntry, StorageError> {
        let path = normalize(path)?;
        match self.stat(&path).await {
            Ok(RemoteObject::Folder(props)) => {
                debug!("Folder {} already exists", path);
                return Ok(self.folder_entry(path, &props));
            }
            Ok(RemoteObject::File(_)) => return Err(StorageError::NotADirectory(path)),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        self.ensure_parents(&path).await?;
        let url = self.paths.to_server_relative(&path)?;
        let props = self.create_folder(&url, &path).await?;
        Ok(self.folder_entry(path, &props))
    }

    async fn has(&self, path: &str) -> Result<bool, StorageError> {
        let path = normalize(path)?;
        match self.stat(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_contents(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<Vec<FileEntry>, StorageError> {
        let path = normalize(path)?;
        let url = self.paths.to_server_relative(&path)?;
        let entries = self.list_folder(url, recursive).await?;
        debug!("Listed {} ({} entries)", path, entries.len());
        Ok(entries)
    }

    async fn get_metadata(&self, path: &str) -> Result<FileEntry, StorageError> {
        let path = normalize(path)?;
        Ok(match self.stat(&path).await? {
            RemoteObject::File(props) => self.file_entry(path, &props),
            RemoteObject::Folder(props) => self.folder_entry(path, &props),
        })
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let (from, to) = (normalize(from)?, normalize(to)?);
        let object = self.stat(&from).await?;
        self.ensure_parents(&to).await?;

        let params = [
            ("@u", literal(&self.paths.to_server_relative(&from)?)),
            ("@n", literal(&self.paths.to_server_relative(&to)?)),
        ];
        let resource = match object {
            RemoteObject::File(_) => endpoints::MOVE_FILE,
            RemoteObject::Folder(_) => endpoints::MOVE_FOLDER,
        };
        self.client.post(resource, &params, &from).await?;

        info!("Moved {} to {}", from, to);
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let (from, to) = (normalize(from)?, normalize(to)?);
        if let RemoteObject::Folder(_) = self.stat(&from).await? {
            return Err(StorageError::Unsupported(format!(
                "copying folder {} is not supported",
                from
            )));
        }
        self.ensure_parents(&to).await?;

        let params = [
            ("@u", literal(&self.paths.to_server_relative(&from)?)),
            ("@n", literal(&self.paths.to_server_relative(&to)?)),
        ];
        self.client.post(endpoints::COPY_FILE, &params, &from).await?;

        info!("Copied {} to {}", from, to);
        Ok(())
    }

    fn url_generator(&self) -> Option<&dyn UrlGenerator> {
        Some(self)
    }
}

impl UrlGenerator for SharepointAdapter {
    fn url(&self, path: &str) -> Result<String, StorageError> {
        self.get_url(path)
    }
}
