use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::{
    domain::{
        errors::StorageResult,
        models::{FileSchema, FileUpload, StoredFile},
        value_objects::ContainerName,
    },
    ports::{
        naming::FilenameGenerator,
        services::FileStorage,
        storage::{BlobBackend, BlobWriteOptions},
    },
};

/// Which container `resolve_url` builds the address from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UrlContainerPolicy {
    /// Always the adapter's configured container, whatever the file recorded
    #[default]
    Configured,
    /// The file's recorded container, falling back to the configured one
    Recorded,
}

/// File storage backed by a blob container
///
/// Holds no per-file state; concurrent calls are independent.
#[derive(Clone)]
pub struct BlobStorageAdapter {
    backend: Arc<dyn BlobBackend>,
    container: ContainerName,
    schema: FileSchema,
    url_container: UrlContainerPolicy,
}

impl BlobStorageAdapter {
    /// Version of the host storage contract this adapter implements
    pub const COMPATIBILITY_LEVEL: u32 = 1;

    pub fn new(backend: Arc<dyn BlobBackend>, container: ContainerName) -> Self {
        Self {
            backend,
            container,
            schema: FileSchema::default(),
            url_container: UrlContainerPolicy::default(),
        }
    }

    pub fn with_schema(mut self, schema: FileSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_url_container_policy(mut self, policy: UrlContainerPolicy) -> Self {
        self.url_container = policy;
        self
    }

    /// The container new uploads are written to
    pub fn container(&self) -> &ContainerName {
        &self.container
    }

    pub fn schema(&self) -> &FileSchema {
        &self.schema
    }

    /// Fields of `file` the host should persist, URL included
    pub fn persisted_fields(&self, file: &StoredFile) -> serde_json::Map<String, serde_json::Value> {
        let url = self.resolve_url(file);
        file.persisted_fields(&self.schema, Some(&url))
    }

    fn recorded_or_configured<'a>(&'a self, file: &'a StoredFile) -> &'a ContainerName {
        file.container.as_ref().unwrap_or(&self.container)
    }
}

#[async_trait]
impl FileStorage for BlobStorageAdapter {
    async fn store(
        &self,
        file: &FileUpload,
        generator: &dyn FilenameGenerator,
    ) -> StorageResult<StoredFile> {
        let blob = generator.generate_filename(file, 0).await?;

        debug!("Uploading file {}", blob);
        let container = self.container.clone();
        let options = BlobWriteOptions {
            content_type: file.mimetype.clone(),
        };
        let result = self
            .backend
            .create_blob_from_local_file(&container, &blob, &file.path, &options)
            .await?;
        debug!("File upload successful: {}/{}", container, blob);

        // Recording the container ties the file to it; renaming the
        // container later needs a data migration.
        Ok(StoredFile {
            filename: blob,
            etag: result.etag,
            container: Some(container),
            mimetype: file.mimetype.clone(),
            original_name: file.original_name.clone(),
            size: file.size,
        })
    }

    fn resolve_url(&self, file: &StoredFile) -> String {
        let container = match self.url_container {
            UrlContainerPolicy::Configured => &self.container,
            UrlContainerPolicy::Recorded => self.recorded_or_configured(file),
        };
        self.backend.blob_url(container, &file.filename)
    }

    async fn remove(&self, file: &StoredFile) -> StorageResult<()> {
        let container = self.recorded_or_configured(file);
        debug!("Removing file {}/{}", container, file.filename);
        self.backend.delete_blob(container, &file.filename).await
    }
}
