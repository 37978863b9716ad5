pub mod file;

pub use file::{FileSchema, FileUpload, StoredFile};
