//! Google Cloud Natural Language provider (REST v1).

use super::{Category, Entity, LanguageProvider, ProviderError, Sentiment, Token};
use crate::services::document::{Document, DocumentSourceKind, DocumentType, EncodingType};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// API key header. The key must never appear in a request URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google provider configuration.
#[derive(Debug, Clone)]
pub struct GoogleLanguageConfig {
    pub api_base: String,
    pub api_key: String,
}

/// Calls `documents:*` methods, authenticating with an API key header.
///
/// One client is shared by all requests. No request timeout is set, so a
/// hanging call holds its request open.
pub struct GoogleLanguageProvider {
    config: GoogleLanguageConfig,
    client: Client,
}

impl GoogleLanguageProvider {
    pub fn new(config: GoogleLanguageConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ProviderError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/documents:{}",
            self.config.api_base.trim_end_matches('/'),
            method
        )
    }

    async fn annotate<R: DeserializeOwned>(
        &self,
        method: &str,
        document: &Document,
    ) -> Result<R, ProviderError> {
        let request = AnnotateRequest {
            document: WireDocument {
                doc_type: document.doc_type,
                source: &document.source,
            },
            encoding_type: document.encoding,
        };

        tracing::debug!(
            method = %method,
            inline = document.is_inline(),
            "Sending request to Natural Language API"
        );

        let response = self
            .client
            .post(self.api_url(method))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Natural Language API error {}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| {
                ProviderError::ApiError(format!("Failed to parse response: {}", e.without_url()))
            })
    }
}

#[async_trait]
impl LanguageProvider for GoogleLanguageProvider {
    async fn analyze_sentiment(
        &self,
        document: &Document,
    ) -> Result<Option<Sentiment>, ProviderError> {
        let response: SentimentResponse = self.annotate("analyzeSentiment", document).await?;
        Ok(response.document_sentiment)
    }

    async fn analyze_entities(
        &self,
        document: &Document,
    ) -> Result<Option<Vec<Entity>>, ProviderError> {
        let response: EntitiesResponse = self.annotate("analyzeEntities", document).await?;
        Ok(response.entities)
    }

    async fn analyze_syntax(&self, document: &Document) -> Result<Option<Vec<Token>>, ProviderError> {
        let response: SyntaxResponse = self.annotate("analyzeSyntax", document).await?;
        Ok(response.tokens)
    }

    async fn analyze_entity_sentiment(
        &self,
        document: &Document,
    ) -> Result<Option<Vec<Entity>>, ProviderError> {
        let response: EntitiesResponse =
            self.annotate("analyzeEntitySentiment", document).await?;
        Ok(response.entities)
    }

    async fn classify_text(
        &self,
        document: &Document,
    ) -> Result<Option<Vec<Category>>, ProviderError> {
        let response: ClassifyResponse = self.annotate("classifyText", document).await?;
        Ok(response.categories)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Natural Language API key not configured".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Natural Language API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateRequest<'a> {
    document: WireDocument<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding_type: Option<EncodingType>,
}

#[derive(Debug, Serialize)]
struct WireDocument<'a> {
    #[serde(rename = "type")]
    doc_type: DocumentType,
    #[serde(flatten)]
    source: &'a DocumentSourceKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentResponse {
    document_sentiment: Option<Sentiment>,
}

#[derive(Debug, Deserialize)]
struct EntitiesResponse {
    entities: Option<Vec<Entity>>,
}

#[derive(Debug, Deserialize)]
struct SyntaxResponse {
    tokens: Option<Vec<Token>>,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    categories: Option<Vec<Category>>,
}
