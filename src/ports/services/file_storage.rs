use crate::{
    domain::{
        errors::StorageResult,
        models::{FileUpload, StoredFile},
    },
    ports::naming::FilenameGenerator,
};
use async_trait::async_trait;

/// Port consumed by the host file-management layer
#[async_trait]
pub trait FileStorage: Send + Sync + 'static {
    /// Upload a file under a freshly generated name
    ///
    /// The returned record carries the blob name, the backend etag and the
    /// container written to. The input is not modified.
    async fn store(
        &self,
        file: &FileUpload,
        generator: &dyn FilenameGenerator,
    ) -> StorageResult<StoredFile>;

    /// Public URL for a stored file
    fn resolve_url(&self, file: &StoredFile) -> String;

    /// Delete the blob behind a stored file
    async fn remove(&self, file: &StoredFile) -> StorageResult<()>;
}
