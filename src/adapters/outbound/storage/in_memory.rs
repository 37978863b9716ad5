use async_trait::async_trait;
use object_store::{ObjectStore as ApacheObjectStore, memory::InMemory};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use crate::{
    adapters::outbound::storage::object_store_backend::{
        ContainerStoreProvider, ObjectStoreBlobBackend, encode_blob_path,
    },
    domain::value_objects::{BlobName, ContainerName},
};

/// In-memory containers for testing and development
///
/// Containers spring into existence on first use.
#[derive(Clone, Default)]
pub struct InMemoryContainerProvider {
    containers: Arc<RwLock<HashMap<ContainerName, Arc<InMemory>>>>,
}

impl InMemoryContainerProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access to a container's store, if it was ever used
    pub async fn container(&self, container: &ContainerName) -> Option<Arc<InMemory>> {
        self.containers.read().await.get(container).cloned()
    }
}

#[async_trait]
impl ContainerStoreProvider for InMemoryContainerProvider {
    async fn store_for(
        &self,
        container: &ContainerName,
    ) -> Result<Arc<dyn ApacheObjectStore>, object_store::Error> {
        if let Some(store) = self.containers.read().await.get(container) {
            return Ok(store.clone());
        }

        let mut containers = self.containers.write().await;
        let store = containers
            .entry(container.clone())
            .or_insert_with(|| Arc::new(InMemory::new()))
            .clone();
        Ok(store)
    }

    fn blob_url(&self, container: &ContainerName, blob: &BlobName) -> String {
        format!("memory:///{}/{}", container, encode_blob_path(blob))
    }
}

/// Blob backend held entirely in memory
pub type InMemoryBlobBackend = ObjectStoreBlobBackend<InMemoryContainerProvider>;

impl InMemoryBlobBackend {
    pub fn in_memory() -> Self {
        ObjectStoreBlobBackend::new(InMemoryContainerProvider::new())
    }
}
