//! Facade plugins
//!
//! Extra methods mounted on a [`Filesystem`](crate::filesystem::Filesystem)
//! at runtime and dispatched by name.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::filesystem::adapter::Adapter;

/// Method name the [`GetUrl`] plugin registers under
pub const GET_URL: &str = "get_url";

#[async_trait]
pub trait Plugin: Send + Sync {
    /// Name the plugin is dispatched by
    fn method(&self) -> &'static str;

    async fn handle(&self, adapter: &dyn Adapter, path: &str) -> Result<String, StorageError>;
}

/// Exposes the adapter's URL generation through the facade
pub struct GetUrl;

#[async_trait]
impl Plugin for GetUrl {
    fn method(&self) -> &'static str {
        GET_URL
    }

    async fn handle(&self, adapter: &dyn Adapter, path: &str) -> Result<String, StorageError> {
        match adapter.url_generator() {
            Some(generator) => generator.url(path),
            None => Err(StorageError::Unsupported(
                "adapter cannot generate URLs".into(),
            )),
        }
    }
}
