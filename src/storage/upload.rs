//! Streamed uploads
//!
//! Streams up to the configured threshold go up in a single request.
//! Longer ones are sent through an upload session: an empty placeholder
//! file is created, then chunks follow strictly in sequence
//! (`StartUpload`, `ContinueUpload`..., `FinishUpload`), each acknowledged
//! with the running byte offset before the next one is sent.

use bytes::Bytes;
use log::{debug, error, info, warn};
use std::io::Cursor;
use tokio::io::{AsyncRead, AsyncReadExt};
use uuid::Uuid;

use crate::error::{RemoteError, StorageError, report};
use crate::filesystem::{ByteSource, FileEntry};
use crate::remote::endpoints::{self, guid, literal};
use crate::remote::models::UploadOffset;
use crate::remote::{FileProps, RestClient};
use crate::storage::adapter::SharepointAdapter;

/// Initial buffer for a chunk; larger chunks grow as bytes arrive
const READ_BUFFER: usize = 64 * 1024;

/// Read until `size` bytes are collected or the source is exhausted.
/// A short chunk means end of stream.
pub(crate) async fn read_chunk<R>(reader: &mut R, size: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut chunk = Vec::with_capacity(size.min(READ_BUFFER));
    (&mut *reader).take(size as u64).read_to_end(&mut chunk).await?;
    Ok(chunk)
}

/// State of one chunked upload. Lives only for the duration of a single
/// `write_stream` call.
pub(crate) struct UploadSession<'a> {
    client: &'a RestClient,
    id: Uuid,
    url: String,
    path: String,
    offset: u64,
}

impl<'a> UploadSession<'a> {
    pub(crate) fn new(client: &'a RestClient, url: String, path: String) -> Self {
        Self {
            client,
            id: Uuid::new_v4(),
            url,
            path,
            offset: 0,
        }
    }

    fn params(&self) -> [(&'static str, String); 2] {
        [("@u", literal(&self.url)), ("@id", guid(&self.id))]
    }

    /// Bytes acknowledged by the service so far
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) async fn start(&mut self, chunk: Vec<u8>) -> Result<(), StorageError> {
        let len = chunk.len();
        let reported: UploadOffset = self
            .client
            .post_json(endpoints::START_UPLOAD, &self.params(), Bytes::from(chunk), &self.path)
            .await?;
        self.advance(len, reported.value)
    }

    pub(crate) async fn append(&mut self, chunk: Vec<u8>) -> Result<(), StorageError> {
        let len = chunk.len();
        let reported: UploadOffset = self
            .client
            .post_json(
                &endpoints::continue_upload(self.offset),
                &self.params(),
                Bytes::from(chunk),
                &self.path,
            )
            .await?;
        self.advance(len, reported.value)
    }

    pub(crate) async fn finish(&mut self, chunk: Vec<u8>) -> Result<FileProps, StorageError> {
        let total = self.offset + chunk.len() as u64;
        let props: FileProps = self
            .client
            .post_json(
                &endpoints::finish_upload(self.offset),
                &self.params(),
                Bytes::from(chunk),
                &self.path,
            )
            .await?;
        self.offset = total;

        if let Some(length) = props.length.filter(|&length| length != total) {
            return Err(RemoteError::UploadRejected {
                expected_offset: total,
                reported_offset: length,
            }
            .into());
        }
        Ok(props)
    }

    /// Cancel the session and remove the placeholder. Best-effort: the
    /// caller is already returning the error that caused the abort.
    pub(crate) async fn abandon(&self) {
        warn!(
            "Abandoning upload session {} for {} at offset {}",
            self.id, self.path, self.offset
        );

        if let Err(e) = self
            .client
            .post(endpoints::CANCEL_UPLOAD, &self.params(), &self.path)
            .await
        {
            report("Cancelling upload session", &e);
        }

        let params = [("@u", literal(&self.url))];
        if let Err(e) = self.client.delete(endpoints::FILE, &params, &self.path).await {
            if !e.is_not_found() {
                report("Removing partial upload", &e);
            }
        }
    }

    fn advance(&mut self, len: usize, reported: u64) -> Result<(), StorageError> {
        let expected = self.offset + len as u64;
        if reported != expected {
            return Err(RemoteError::UploadRejected {
                expected_offset: expected,
                reported_offset: reported,
            }
            .into());
        }
        self.offset = expected;
        debug!("Upload of {} acknowledged up to {} bytes", self.path, expected);
        Ok(())
    }
}

impl SharepointAdapter {
    /// Upload a stream, picking single-shot or chunked by its length.
    pub(crate) async fn put_stream(
        &self,
        path: &str,
        stream: &mut ByteSource<'_>,
    ) -> Result<FileEntry, StorageError> {
        let head = read_chunk(stream, self.upload_threshold.saturating_add(1)).await?;
        if head.len() <= self.upload_threshold {
            debug!("Stream for {} fits one request ({} bytes)", path, head.len());
            return self.put(path, Bytes::from(head)).await;
        }

        let mut source = Cursor::new(head).chain(&mut *stream);
        let first = read_chunk(&mut source, self.chunk_size).await?;
        let next = read_chunk(&mut source, self.chunk_size).await?;
        if next.is_empty() {
            return self.put(path, Bytes::from(first)).await;
        }

        // The session needs an existing file to attach to
        self.put(path, Bytes::new()).await?;

        let url = self.paths.to_server_relative(path)?;
        let mut session = UploadSession::new(&self.client, url, path.to_string());
        info!(
            "Starting chunked upload of {} ({} byte chunks)",
            path, self.chunk_size
        );

        match self.send_chunks(&mut session, &mut source, first, next).await {
            Ok(props) => {
                info!("Chunked upload of {} complete ({} bytes)", path, session.offset());
                Ok(self.file_entry(path.to_string(), &props))
            }
            Err(e) => {
                error!("Chunked upload of {} failed: {}", path, e);
                session.abandon().await;
                Err(e)
            }
        }
    }

    async fn send_chunks<R>(
        &self,
        session: &mut UploadSession<'_>,
        source: &mut R,
        first: Vec<u8>,
        mut next: Vec<u8>,
    ) -> Result<FileProps, StorageError>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        session.start(first).await?;
        loop {
            let current = next;
            next = read_chunk(source, self.chunk_size).await?;
            if next.is_empty() {
                return session.finish(current).await;
            }
            session.append(current).await?;
        }
    }
}
