use async_trait::async_trait;
use object_store::{
    Attribute, Attributes, ObjectStore as ApacheObjectStore, PutMultipartOpts, PutOptions,
    PutPayload, PutResult, WriteMultipart, path::Path as ObjectPath,
};
use std::{path::Path, sync::Arc};
use tokio::{fs::File, io::AsyncReadExt};
use tracing::debug;

use crate::{
    adapters::outbound::storage::error::{backend_error, source_error},
    domain::{
        errors::StorageResult,
        value_objects::{BlobName, ContainerName},
    },
    ports::storage::{BlobBackend, BlobWriteOptions, BlobWriteResult},
};

/// Supplies an Apache object_store handle bound to a container
#[async_trait]
pub trait ContainerStoreProvider: Send + Sync + 'static {
    /// Store handle for `container`
    async fn store_for(
        &self,
        container: &ContainerName,
    ) -> Result<Arc<dyn ApacheObjectStore>, object_store::Error>;

    /// Canonical public URL of a blob
    fn blob_url(&self, container: &ContainerName, blob: &BlobName) -> String;
}

/// Files up to this size are sent in a single put
pub const DEFAULT_SINGLE_PUT_LIMIT: u64 = 8 * 1024 * 1024;

const PART_SIZE: usize = 5 * 1024 * 1024;
const READ_BUFFER_SIZE: usize = 64 * 1024;
const MAX_PARTS_IN_FLIGHT: usize = 4;

/// Adapter that implements our BlobBackend trait using Apache object_store
pub struct ObjectStoreBlobBackend<P> {
    provider: P,
    single_put_limit: u64,
}

impl<P: ContainerStoreProvider> ObjectStoreBlobBackend<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            single_put_limit: DEFAULT_SINGLE_PUT_LIMIT,
        }
    }

    /// Larger files are streamed as a multipart upload instead of read whole
    pub fn with_single_put_limit(mut self, limit: u64) -> Self {
        self.single_put_limit = limit;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn to_object_path(blob: &BlobName) -> ObjectPath {
        ObjectPath::from(blob.as_str())
    }
}

/// Stream `file` into a multipart upload, committed as one blob on finish
async fn stream_file(
    store: &dyn ApacheObjectStore,
    location: &ObjectPath,
    file: &mut File,
    source: &Path,
    attributes: Attributes,
    container: &ContainerName,
    blob: &BlobName,
) -> StorageResult<PutResult> {
    let upload = store
        .put_multipart_opts(
            location,
            PutMultipartOpts {
                attributes,
                ..Default::default()
            },
        )
        .await
        .map_err(|e| backend_error("put", container, blob, e))?;
    let mut writer = WriteMultipart::new_with_chunk_size(upload, PART_SIZE);
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let read = match file.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                // Nothing becomes visible unless the upload is finished
                if let Err(abort_err) = writer.abort().await {
                    debug!("Aborting upload of {}/{} failed: {}", container, blob, abort_err);
                }
                return Err(source_error(source, e));
            }
        };
        writer
            .wait_for_capacity(MAX_PARTS_IN_FLIGHT)
            .await
            .map_err(|e| backend_error("put", container, blob, e))?;
        writer.write(&buf[..read]);
    }

    writer
        .finish()
        .await
        .map_err(|e| backend_error("put", container, blob, e))
}

#[async_trait]
impl<P: ContainerStoreProvider> BlobBackend for ObjectStoreBlobBackend<P> {
    async fn create_blob_from_local_file(
        &self,
        container: &ContainerName,
        blob: &BlobName,
        source: &Path,
        options: &BlobWriteOptions,
    ) -> StorageResult<BlobWriteResult> {
        let store = self
            .provider
            .store_for(container)
            .await
            .map_err(|e| backend_error("put", container, blob, e))?;

        let mut file = File::open(source)
            .await
            .map_err(|e| source_error(source, e))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| source_error(source, e))?
            .len();
        debug!(
            "Writing {} bytes from {} to {}/{}",
            size,
            source.display(),
            container,
            blob
        );

        let mut attributes = Attributes::new();
        if let Some(content_type) = &options.content_type {
            attributes.insert(Attribute::ContentType, content_type.clone().into());
        }
        let location = Self::to_object_path(blob);

        let result = if size > self.single_put_limit {
            stream_file(
                store.as_ref(),
                &location,
                &mut file,
                source,
                attributes,
                container,
                blob,
            )
            .await?
        } else {
            let mut data = Vec::with_capacity(size as usize);
            file.read_to_end(&mut data)
                .await
                .map_err(|e| source_error(source, e))?;
            let put_options = PutOptions {
                attributes,
                ..Default::default()
            };
            store
                .put_opts(&location, PutPayload::from(data), put_options)
                .await
                .map_err(|e| backend_error("put", container, blob, e))?
        };

        Ok(BlobWriteResult { etag: result.e_tag })
    }

    fn blob_url(&self, container: &ContainerName, blob: &BlobName) -> String {
        self.provider.blob_url(container, blob)
    }

    async fn delete_blob(&self, container: &ContainerName, blob: &BlobName) -> StorageResult<()> {
        let store = self
            .provider
            .store_for(container)
            .await
            .map_err(|e| backend_error("delete", container, blob, e))?;

        store
            .delete(&Self::to_object_path(blob))
            .await
            .map_err(|e| backend_error("delete", container, blob, e))?;

        Ok(())
    }
}

/// Percent-encode a blob name one path segment at a time
pub(crate) fn encode_blob_path(blob: &BlobName) -> String {
    blob.segments()
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
