use async_trait::async_trait;

use crate::core::error::Result;

/// Remote object store holding uploaded files
///
/// Locations handed out by [`ObjectStore::put`] are absolute URLs and are
/// persisted verbatim as the file location.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload bytes under `key`, returning the object URL
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String>;

    /// Fetch the bytes behind an object URL
    async fn get(&self, url: &str) -> Result<Vec<u8>>;

    /// Delete the object behind an object URL
    async fn remove(&self, url: &str) -> Result<()>;

    /// URL a client can be redirected to for downloading the object
    async fn access_url(&self, url: &str) -> Result<String>;

    /// Namespace prepended to every uploaded key
    fn upload_prefix(&self) -> &str;
}
