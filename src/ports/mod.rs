pub mod naming;
pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use naming::FilenameGenerator;
pub use services::FileStorage;
pub use storage::{BlobBackend, BlobWriteOptions, BlobWriteResult};
