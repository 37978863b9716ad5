use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::domain::{
    errors::ValidationError,
    value_objects::{BlobName, ContainerName},
};

/// A file waiting to be uploaded, as handed over by the host
///
/// The temporary file at `path` belongs to the caller; it is only read.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub path: PathBuf,
    pub mimetype: Option<String>,
    pub original_name: Option<String>,
    pub size: Option<u64>,
}

impl FileUpload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mimetype: None,
            original_name: None,
            size: None,
        }
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn with_original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = Some(name.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// A file that has been written to blob storage
///
/// `container` records where the blob was written. It is optional because
/// records persisted without the container field still have to be
/// resolvable and removable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub filename: BlobName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(
        default,
        rename = "originalname",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl StoredFile {
    /// A record that only knows its blob name
    pub fn new(filename: BlobName) -> Self {
        Self {
            filename,
            etag: None,
            container: None,
            mimetype: None,
            original_name: None,
            size: None,
        }
    }

    pub fn with_container(mut self, container: ContainerName) -> Self {
        self.container = Some(container);
        self
    }

    /// Fields the host should save, filtered by the schema
    ///
    /// `filename` is always present. `url` is included when given.
    pub fn persisted_fields(&self, schema: &FileSchema, url: Option<&str>) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("filename".into(), Value::from(self.filename.as_str()));

        if let Some(mimetype) = &self.mimetype {
            fields.insert("mimetype".into(), Value::from(mimetype.as_str()));
        }
        if let Some(name) = &self.original_name {
            fields.insert("originalname".into(), Value::from(name.as_str()));
        }
        if let Some(size) = self.size {
            fields.insert("size".into(), Value::from(size));
        }
        if schema.etag {
            if let Some(etag) = &self.etag {
                fields.insert("etag".into(), Value::from(etag.as_str()));
            }
        }
        if schema.container {
            if let Some(container) = &self.container {
                fields.insert("container".into(), Value::from(container.as_str()));
            }
        }
        if let Some(url) = url {
            fields.insert("url".into(), Value::from(url));
        }

        fields
    }

    /// Rebuild a record from fields the host saved earlier
    pub fn from_persisted(value: &Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value.clone()).map_err(|e| ValidationError::InvalidField {
            field: "file".to_string(),
            value: value.to_string(),
            expected: e.to_string(),
        })
    }
}

/// Which optional fields the host schema persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSchema {
    #[serde(default = "enabled")]
    pub container: bool,
    #[serde(default = "enabled")]
    pub etag: bool,
}

fn enabled() -> bool {
    true
}

impl Default for FileSchema {
    fn default() -> Self {
        Self {
            container: true,
            etag: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored() -> StoredFile {
        StoredFile {
            filename: BlobName::new("photo1.jpg".to_string()).unwrap(),
            etag: Some("\"0x8D1\"".to_string()),
            container: Some(ContainerName::new("media".to_string()).unwrap()),
            mimetype: Some("image/jpeg".to_string()),
            original_name: Some("Holiday.JPG".to_string()),
            size: Some(42),
        }
    }

    #[test]
    fn test_persisted_fields_follow_schema() {
        let file = stored();

        let all = file.persisted_fields(&FileSchema::default(), Some("https://x/media/photo1.jpg"));
        assert_eq!(
            Value::Object(all),
            json!({
                "filename": "photo1.jpg",
                "etag": "\"0x8D1\"",
                "container": "media",
                "mimetype": "image/jpeg",
                "originalname": "Holiday.JPG",
                "size": 42,
                "url": "https://x/media/photo1.jpg",
            })
        );

        let minimal = file.persisted_fields(
            &FileSchema {
                container: false,
                etag: false,
            },
            None,
        );
        assert!(!minimal.contains_key("etag"));
        assert!(!minimal.contains_key("container"));
        assert!(!minimal.contains_key("url"));
        assert_eq!(minimal["filename"], "photo1.jpg");
    }

    #[test]
    fn test_from_persisted_without_container() {
        let file = StoredFile::from_persisted(&json!({ "filename": "x.png" })).unwrap();
        assert_eq!(file.filename.as_str(), "x.png");
        assert_eq!(file.container, None);
        assert_eq!(file.etag, None);
    }

    #[test]
    fn test_from_persisted_round_trips_saved_fields() {
        let file = stored();
        let saved = Value::Object(file.persisted_fields(&FileSchema::default(), None));
        assert_eq!(StoredFile::from_persisted(&saved).unwrap(), file);
    }

    #[test]
    fn test_from_persisted_rejects_invalid_names() {
        assert!(StoredFile::from_persisted(&json!({ "filename": "" })).is_err());
        assert!(StoredFile::from_persisted(&json!({ "filename": "a", "container": "UP" })).is_err());
        assert!(StoredFile::from_persisted(&json!({ "etag": "x" })).is_err());
    }

    #[test]
    fn test_schema_defaults() {
        let schema: FileSchema = serde_json::from_value(json!({ "etag": false })).unwrap();
        assert!(schema.container);
        assert!(!schema.etag);
    }
}
