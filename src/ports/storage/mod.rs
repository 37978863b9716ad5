mod blob_backend;

pub use blob_backend::{BlobBackend, BlobWriteOptions, BlobWriteResult};
