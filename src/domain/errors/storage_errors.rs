use std::path::PathBuf;

use crate::domain::{
    errors::ValidationError,
    value_objects::{BlobName, ContainerName},
};

/// Errors reported by a filename generator
#[derive(Debug, Clone, PartialEq)]
pub enum FilenameError {
    /// Every candidate name up to the index limit was rejected
    Exhausted { attempts: u32 },

    /// The generated name is not a valid blob name
    InvalidName(ValidationError),

    /// Generator-specific failure
    Other { message: String },
}

impl std::fmt::Display for FilenameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilenameError::Exhausted { attempts } => {
                write!(f, "No unique filename found after {} attempts", attempts)
            }
            FilenameError::InvalidName(err) => write!(f, "Generated filename is invalid: {}", err),
            FilenameError::Other { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for FilenameError {}

impl From<ValidationError> for FilenameError {
    fn from(err: ValidationError) -> Self {
        FilenameError::InvalidName(err)
    }
}

/// Errors that can occur during file storage operations
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// The filename generator failed; the backend was not contacted
    FilenameGeneration(FilenameError),

    /// The local upload source could not be read
    SourceUnreadable { path: PathBuf, message: String },

    /// The backend reported that the blob does not exist
    NotFound {
        container: ContainerName,
        blob: BlobName,
    },

    /// Any other failure from the storage service
    Backend {
        operation: String,
        container: ContainerName,
        blob: BlobName,
        message: String,
    },
}

impl StorageError {
    /// Whether this error came from the storage service
    pub fn is_backend(&self) -> bool {
        matches!(self, StorageError::Backend { .. } | StorageError::NotFound { .. })
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::FilenameGeneration(err) => {
                write!(f, "Filename generation failed: {}", err)
            }
            StorageError::SourceUnreadable { path, message } => {
                write!(
                    f,
                    "Cannot read upload source '{}': {}",
                    path.display(),
                    message
                )
            }
            StorageError::NotFound { container, blob } => {
                write!(f, "Blob not found: {}/{}", container, blob)
            }
            StorageError::Backend {
                operation,
                container,
                blob,
                message,
            } => {
                write!(
                    f,
                    "Storage backend error during '{}' on {}/{}: {}",
                    operation, container, blob, message
                )
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::FilenameGeneration(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FilenameError> for StorageError {
    fn from(err: FilenameError) -> Self {
        StorageError::FilenameGeneration(err)
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
