use crate::domain::{errors::FilenameError, models::FileUpload, value_objects::BlobName};
use async_trait::async_trait;

/// Produces the storage key for an upload
///
/// `index` is a disambiguation counter; callers start at zero. An
/// implementation that checks for collisions retries with a higher index
/// itself and only returns once it has a unique name or gives up.
#[async_trait]
pub trait FilenameGenerator: Send + Sync {
    async fn generate_filename(
        &self,
        file: &FileUpload,
        index: u32,
    ) -> Result<BlobName, FilenameError>;
}
