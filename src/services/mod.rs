mod blob_storage_adapter;

pub use blob_storage_adapter::{BlobStorageAdapter, UrlContainerPolicy};
