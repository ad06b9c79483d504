//! Streamed reads over a SharePoint `$value` response

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Response;

use crate::error::StorageError;
use crate::filesystem::ReadStream;

pub(crate) struct ResponseStream {
    response: Response,
}

impl ResponseStream {
    pub(crate) fn new(response: Response) -> Self {
        Self { response }
    }
}

#[async_trait]
impl ReadStream for ResponseStream {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, StorageError> {
        Ok(self.response.chunk().await?)
    }
}
