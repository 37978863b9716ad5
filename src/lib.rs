pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - stored file records and value objects
pub use domain::{
    // Value objects
    BlobName,
    ContainerName,
    // Models
    FileSchema,
    FileUpload,
    StoredFile,
    // Errors
    FilenameError,
    StorageError,
    StorageResult,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{BlobBackend, BlobWriteOptions, BlobWriteResult, FileStorage, FilenameGenerator};

// Service implementations
pub use services::{BlobStorageAdapter, UrlContainerPolicy};

// Adapter configuration and construction
pub use app::{
    AdapterBuilder, AdapterConfig, AdapterOptions, AzureOptions, ConfigError,
    container_options, create_adapter_from_env, create_in_memory_adapter,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    naming::RandomFilenameGenerator,
    storage::{AzureBlobBackend, AzureCredentials, AzureSettings, InMemoryBlobBackend},
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        AdapterBuilder, AdapterOptions, BlobName, BlobStorageAdapter, ContainerName, FileSchema,
        FileStorage, FileUpload, FilenameGenerator, RandomFilenameGenerator, StoredFile,
        create_in_memory_adapter,
    };
}
