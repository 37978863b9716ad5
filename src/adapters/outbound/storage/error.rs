use std::{io, path::Path};

use crate::domain::{
    errors::StorageError,
    value_objects::{BlobName, ContainerName},
};

/// Convert an object_store error for a given blob into a domain error
pub(crate) fn backend_error(
    operation: &str,
    container: &ContainerName,
    blob: &BlobName,
    err: object_store::Error,
) -> StorageError {
    match err {
        object_store::Error::NotFound { .. } => StorageError::NotFound {
            container: container.clone(),
            blob: blob.clone(),
        },
        _ => StorageError::Backend {
            operation: operation.to_string(),
            container: container.clone(),
            blob: blob.clone(),
            message: err.to_string(),
        },
    }
}

/// Convert a failure reading the local upload source into a domain error
pub(crate) fn source_error(path: &Path, err: io::Error) -> StorageError {
    StorageError::SourceUnreadable {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
