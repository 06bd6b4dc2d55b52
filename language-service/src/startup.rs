use crate::config::{DocumentSource, LanguageConfig, StorageBackend};
use crate::handlers;
use crate::services::language::google::{GoogleLanguageConfig, GoogleLanguageProvider};
use crate::services::{GcsStorage, LanguageProvider, LocalStorage, Storage};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Process-wide handles shared by every request. Nothing in here is
/// mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub language: Arc<dyn LanguageProvider>,
    pub document_source: DocumentSource,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, language: Arc<dyn LanguageProvider>) -> Self {
        Self {
            storage,
            language,
            document_source: DocumentSource::Fetch,
        }
    }

    pub fn with_document_source(mut self, document_source: DocumentSource) -> Self {
        self.document_source = document_source;
        self
    }

    /// Build the storage reader and language client described by `config`.
    pub fn from_config(config: &LanguageConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn Storage> = match config.storage.backend {
            StorageBackend::Gcs => Arc::new(
                GcsStorage::new(
                    config.storage.api_base.clone(),
                    config.storage.bucket.clone(),
                    config.storage.access_token.clone(),
                )
                .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?,
            ),
            StorageBackend::Local => Arc::new(LocalStorage::new(
                config.storage.local_path.clone(),
                config.storage.bucket.clone(),
            )),
        };

        let language: Arc<dyn LanguageProvider> = Arc::new(
            GoogleLanguageProvider::new(GoogleLanguageConfig {
                api_base: config.language.api_base.clone(),
                api_key: config.language.api_key.clone(),
            })
            .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?,
        );

        tracing::info!(
            backend = ?config.storage.backend,
            bucket = %config.storage.bucket,
            document_source = ?config.document_source,
            "Initialized storage reader and language provider"
        );

        Ok(Self::new(storage, language).with_document_source(config.document_source))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/sentiment-by-text", post(handlers::sentiment_by_text))
        .route("/sentiment-by-file", get(handlers::sentiment_by_file))
        .route("/entities-by-file", get(handlers::entities_by_file))
        .route("/syntax-by-file", get(handlers::syntax_by_file))
        .route(
            "/entity-sentiment-by-file",
            get(handlers::entity_sentiment_by_file),
        )
        .route("/classify-by-file", get(handlers::classify_by_file))
        .route("/v1/sentiment-by-text", post(handlers::sentiment_by_text_v1))
        .route("/v1/sentiment-by-file", get(handlers::sentiment_by_file_v1))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: LanguageConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(&config)?;
        let router = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
