use crate::domain::{
    errors::StorageResult,
    value_objects::{BlobName, ContainerName},
};
use async_trait::async_trait;
use std::path::Path;

/// Port for the blob storage service
/// This abstracts the actual backend (Azure Blob Storage, in-memory, etc.)
///
/// Every call names its container explicitly, so one backend handle can
/// serve files recorded under a container other than the configured one.
#[async_trait]
pub trait BlobBackend: Send + Sync + 'static {
    /// Write a blob whose content is the local file at `source`
    async fn create_blob_from_local_file(
        &self,
        container: &ContainerName,
        blob: &BlobName,
        source: &Path,
        options: &BlobWriteOptions,
    ) -> StorageResult<BlobWriteResult>;

    /// Public URL of a blob
    ///
    /// Only builds the address; whether it can be fetched depends on the
    /// container's access policy.
    fn blob_url(&self, container: &ContainerName, blob: &BlobName) -> String;

    /// Delete a blob
    async fn delete_blob(&self, container: &ContainerName, blob: &BlobName) -> StorageResult<()>;
}

/// Metadata sent along with a blob write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlobWriteOptions {
    pub content_type: Option<String>,
}

/// What the backend reports after a successful write
#[derive(Debug, Clone, PartialEq)]
pub struct BlobWriteResult {
    /// Opaque version tag, passed through exactly as the backend returned it
    pub etag: Option<String>,
}
