// Infrastructure error conversions
pub mod error;

// Storage implementations
pub mod in_memory;
pub mod object_store_backend;

// Provider-specific implementations
pub mod azure;

// Re-export key types
pub use azure::{AzureBlobBackend, AzureContainerProvider, AzureCredentials, AzureSettings};
pub use in_memory::{InMemoryBlobBackend, InMemoryContainerProvider};
pub use object_store_backend::{ContainerStoreProvider, ObjectStoreBlobBackend};
