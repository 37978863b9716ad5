mod blob_name;
mod container_name;

pub use blob_name::BlobName;
pub use container_name::ContainerName;
