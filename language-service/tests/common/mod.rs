#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use language_service::services::language::mock::MockLanguageProvider;
use language_service::services::language::{Entity, EntityType, LanguageProvider, Sentiment};
use language_service::services::{Storage, StorageError};
use language_service::startup::{build_router, AppState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::util::ServiceExt;

pub const TEST_BUCKET: &str = "test-bucket";

/// In-memory storage reader that counts reads.
pub struct FakeStorage {
    objects: HashMap<String, String>,
    failure: Option<String>,
    reads: AtomicUsize,
}

impl FakeStorage {
    pub fn with_object(name: &str, text: &str) -> Self {
        let mut objects = HashMap::new();
        objects.insert(name.to_string(), text.to_string());
        Self {
            objects,
            failure: None,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            objects: HashMap::new(),
            failure: None,
            reads: AtomicUsize::new(0),
        }
    }

    /// Every read fails as if the connection dropped mid-stream.
    pub fn broken(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::empty()
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for FakeStorage {
    fn bucket(&self) -> &str {
        TEST_BUCKET
    }

    async fn read_text(&self, filename: &str) -> Result<String, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                message.clone(),
            )));
        }

        self.objects
            .get(filename)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("gs://{}/{}", TEST_BUCKET, filename)))
    }
}

pub struct TestApp {
    pub router: Router,
    pub storage: Arc<FakeStorage>,
    pub language: Arc<MockLanguageProvider>,
}

impl TestApp {
    pub fn new(storage: FakeStorage, language: MockLanguageProvider) -> Self {
        let storage = Arc::new(storage);
        let language = Arc::new(language);
        let state = AppState::new(
            storage.clone() as Arc<dyn Storage>,
            language.clone() as Arc<dyn LanguageProvider>,
        );

        Self {
            router: build_router(state),
            storage,
            language,
        }
    }

    pub fn with_state(state: AppState, storage: Arc<FakeStorage>, language: Arc<MockLanguageProvider>) -> Self {
        Self {
            router: build_router(state),
            storage,
            language,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        send(self.router.clone(), request).await
    }

    pub async fn post_json(&self, uri: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(self.router.clone(), request).await
    }
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Serve `router` on a random local port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://127.0.0.1:{}", port)
}

pub fn entity(name: &str, entity_type: EntityType, salience: Option<f64>) -> Entity {
    Entity {
        name: name.to_string(),
        entity_type,
        salience,
        sentiment: None,
    }
}

pub fn entity_with_sentiment(
    name: &str,
    entity_type: EntityType,
    salience: Option<f64>,
    sentiment: Option<Sentiment>,
) -> Entity {
    Entity {
        sentiment,
        ..entity(name, entity_type, salience)
    }
}
