use async_trait::async_trait;
use std::path::Path;
use uuid::Uuid;

use crate::{
    domain::{errors::FilenameError, models::FileUpload, value_objects::BlobName},
    ports::naming::FilenameGenerator,
};

/// Longest extension carried over from the original file name
const MAX_EXTENSION_LEN: usize = 10;

/// Names uploads with a random UUID, keeping the original extension
///
/// Collisions are not checked; a v4 UUID makes them negligible. A non-zero
/// index is appended to the stem so that callers which do check can ask
/// for a distinct candidate.
#[derive(Debug, Clone, Default)]
pub struct RandomFilenameGenerator {
    prefix: Option<String>,
}

impl RandomFilenameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place every generated name under a virtual directory
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_matches('/').to_string();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    fn extension(file: &FileUpload) -> Option<String> {
        let source = match &file.original_name {
            Some(name) => Path::new(name),
            None => file.path.as_path(),
        };

        source
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| {
                !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LEN
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .map(|ext| ext.to_ascii_lowercase())
    }
}

#[async_trait]
impl FilenameGenerator for RandomFilenameGenerator {
    async fn generate_filename(
        &self,
        file: &FileUpload,
        index: u32,
    ) -> Result<BlobName, FilenameError> {
        let mut name = String::new();
        if let Some(prefix) = &self.prefix {
            name.push_str(prefix);
            name.push('/');
        }

        name.push_str(&Uuid::new_v4().simple().to_string());
        if index > 0 {
            name.push_str(&format!("-{}", index));
        }
        if let Some(ext) = Self::extension(file) {
            name.push('.');
            name.push_str(&ext);
        }

        Ok(BlobName::new(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keeps_lowercased_extension() {
        let file = FileUpload::new("/tmp/upload_abc").with_original_name("Holiday.JPG");
        let name = RandomFilenameGenerator::new()
            .generate_filename(&file, 0)
            .await
            .unwrap();

        assert!(name.as_str().ends_with(".jpg"));
        assert_eq!(name.as_str().len(), 32 + ".jpg".len());
    }

    #[tokio::test]
    async fn test_falls_back_to_temp_path_extension() {
        let file = FileUpload::new("/tmp/upload.png");
        let name = RandomFilenameGenerator::new()
            .generate_filename(&file, 0)
            .await
            .unwrap();
        assert!(name.as_str().ends_with(".png"));
    }

    #[tokio::test]
    async fn test_index_and_prefix() {
        let file = FileUpload::new("/tmp/x").with_original_name("report.pdf");
        let name = RandomFilenameGenerator::new()
            .with_prefix("/uploads/")
            .generate_filename(&file, 2)
            .await
            .unwrap();

        assert!(name.as_str().starts_with("uploads/"));
        assert!(name.as_str().ends_with("-2.pdf"));
    }

    #[tokio::test]
    async fn test_suspicious_extensions_are_dropped() {
        let file = FileUpload::new("/tmp/x").with_original_name("evil.ph p");
        let name = RandomFilenameGenerator::new()
            .generate_filename(&file, 0)
            .await
            .unwrap();
        assert!(!name.as_str().contains('.'));
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let generator = RandomFilenameGenerator::new();
        let file = FileUpload::new("/tmp/x.txt");
        let a = generator.generate_filename(&file, 0).await.unwrap();
        let b = generator.generate_filename(&file, 0).await.unwrap();
        assert_ne!(a, b);
    }
}
