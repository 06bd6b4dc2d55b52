mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::send;
use language_service::services::language::mock::MockLanguageProvider;
use language_service::services::{LanguageProvider, LocalStorage, Storage, StorageError};
use language_service::startup::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;

struct Fixture {
    root: PathBuf,
    storage: LocalStorage,
}

impl Fixture {
    async fn new() -> Self {
        let root = PathBuf::from(format!("target/test-storage-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(root.join("articles/news"))
            .await
            .expect("Failed to create storage directory");

        Self {
            storage: LocalStorage::new(root.clone(), "articles"),
            root,
        }
    }

    async fn put(&self, name: &str, contents: &[u8]) {
        tokio::fs::write(self.root.join("articles").join(name), contents)
            .await
            .expect("Failed to write object");
    }

    async fn cleanup(self) {
        let _ = tokio::fs::remove_dir_all(&self.root).await;
    }
}

#[tokio::test]
async fn reads_object_spanning_many_chunks() {
    let fixture = Fixture::new().await;
    let text = "Zürich è bella. ".repeat(1_500);
    fixture.put("news/long.txt", text.as_bytes()).await;

    let read = fixture.storage.read_text("news/long.txt").await.unwrap();

    assert_eq!(read.len(), text.len());
    assert_eq!(read, text);
    fixture.cleanup().await;
}

#[tokio::test]
async fn invalid_utf8_is_replaced_not_rejected() {
    let fixture = Fixture::new().await;
    fixture.put("latin1.txt", b"caf\xe9 au lait").await;

    let read = fixture.storage.read_text("latin1.txt").await.unwrap();

    assert_eq!(read, "caf\u{FFFD} au lait");
    fixture.cleanup().await;
}

#[tokio::test]
async fn missing_object_is_not_found() {
    let fixture = Fixture::new().await;

    match fixture.storage.read_text("absent.txt").await {
        Err(StorageError::NotFound(object)) => assert_eq!(object, "articles/absent.txt"),
        other => panic!("expected NotFound, got {:?}", other),
    }
    fixture.cleanup().await;
}

#[tokio::test]
async fn failed_read_does_not_reveal_disk_location() {
    let fixture = Fixture::new().await;
    let storage = LocalStorage::new(fixture.root.clone(), "articles");
    let router = build_router(AppState::new(
        Arc::new(storage) as Arc<dyn Storage>,
        Arc::new(MockLanguageProvider::new()) as Arc<dyn LanguageProvider>,
    ));

    let request = Request::builder()
        .uri("/entities-by-file?filename=absent.txt")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("articles/absent.txt"));
    assert!(!body.contains("test-storage-"));
    fixture.cleanup().await;
}

#[tokio::test]
async fn escaping_the_bucket_is_rejected() {
    let fixture = Fixture::new().await;
    tokio::fs::write(fixture.root.join("secret.txt"), "outside")
        .await
        .unwrap();

    assert!(matches!(
        fixture.storage.read_text("../secret.txt").await,
        Err(StorageError::InvalidObjectName(_))
    ));
    assert_eq!(fixture.storage.bucket(), "articles");
    fixture.cleanup().await;
}
