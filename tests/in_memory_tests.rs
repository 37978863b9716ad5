use blob_file_storage::{
    AdapterBuilder, ContainerName, FileStorage, FileUpload, InMemoryBlobBackend,
    RandomFilenameGenerator, StoredFile, UrlContainerPolicy, container_options,
    create_in_memory_adapter,
};
use object_store::{ObjectStore, path::Path as ObjectPath};
use std::{path::PathBuf, sync::Arc};

async fn write_temp(content: &[u8], extension: &str) -> PathBuf {
    let path =
        std::env::temp_dir().join(format!("blob-test-{}.{}", uuid::Uuid::new_v4(), extension));
    tokio::fs::write(&path, content).await.unwrap();
    path
}

#[tokio::test]
async fn upload_resolve_and_remove() {
    let backend = Arc::new(InMemoryBlobBackend::in_memory());
    let adapter = AdapterBuilder::new()
        .with_options(container_options("media"))
        .with_backend(backend.clone())
        .build_with_env(|_| None)
        .unwrap();

    let path = write_temp(b"GIF89a", "gif").await;
    let upload = FileUpload::new(&path)
        .with_mimetype("image/gif")
        .with_size(6);

    let stored = adapter
        .store(&upload, &RandomFilenameGenerator::new())
        .await
        .unwrap();
    assert!(stored.filename.as_str().ends_with(".gif"));

    let media = ContainerName::new("media".to_string()).unwrap();
    let store = backend.provider().container(&media).await.unwrap();
    let data = store
        .get(&ObjectPath::from(stored.filename.as_str()))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(data.as_ref(), b"GIF89a");

    assert_eq!(
        adapter.resolve_url(&stored),
        format!("memory:///media/{}", stored.filename)
    );

    adapter.remove(&stored).await.unwrap();
    assert!(
        store
            .head(&ObjectPath::from(stored.filename.as_str()))
            .await
            .is_err()
    );

    // The temp file belongs to the caller
    assert!(path.exists());
    tokio::fs::remove_file(&path).await.unwrap();
}

#[tokio::test]
async fn files_survive_a_container_change() {
    let backend = Arc::new(InMemoryBlobBackend::in_memory());
    let path = write_temp(b"v1", "txt").await;

    let before = AdapterBuilder::new()
        .with_options(container_options("old-bucket"))
        .with_backend(backend.clone())
        .build_with_env(|_| None)
        .unwrap();
    let stored = before
        .store(&FileUpload::new(&path), &RandomFilenameGenerator::new())
        .await
        .unwrap();

    // Persist and reload the record as the host would
    let saved = serde_json::Value::Object(before.persisted_fields(&stored));
    let reloaded = StoredFile::from_persisted(&saved).unwrap();

    let mut options = container_options("new-bucket");
    options.url_container = UrlContainerPolicy::Recorded;
    let after = AdapterBuilder::new()
        .with_options(options)
        .with_backend(backend.clone())
        .build_with_env(|_| None)
        .unwrap();

    assert_eq!(
        after.resolve_url(&reloaded),
        format!("memory:///old-bucket/{}", reloaded.filename)
    );

    after.remove(&reloaded).await.unwrap();
    let old = backend
        .provider()
        .container(&ContainerName::new("old-bucket".to_string()).unwrap())
        .await
        .unwrap();
    assert!(
        old.head(&ObjectPath::from(reloaded.filename.as_str()))
            .await
            .is_err()
    );

    tokio::fs::remove_file(&path).await.unwrap();
}

#[tokio::test]
async fn in_memory_adapter_factory() {
    let adapter = create_in_memory_adapter("media").unwrap();
    let path = write_temp(b"hello", "txt").await;

    let stored = adapter
        .store(
            &FileUpload::new(&path).with_mimetype("text/plain"),
            &RandomFilenameGenerator::new().with_prefix("docs"),
        )
        .await
        .unwrap();
    assert!(stored.filename.as_str().starts_with("docs/"));
    assert_eq!(stored.container.as_ref().map(|c| c.as_str()), Some("media"));

    tokio::fs::remove_file(&path).await.unwrap();
}

#[test]
fn in_memory_adapter_rejects_bad_container() {
    assert!(create_in_memory_adapter("Bad_Container").is_err());
}
