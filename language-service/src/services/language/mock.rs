//! Mock provider implementation for testing.

use super::{Category, Entity, LanguageProvider, ProviderError, Sentiment, Token};
use crate::services::document::Document;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Returns canned results and records every document it is asked about.
///
/// Each capability answers with whatever was configured for it; an
/// unconfigured capability answers `Ok(None)`, as the real service does when
/// the result field is missing.
#[derive(Default)]
pub struct MockLanguageProvider {
    sentiment: Option<Sentiment>,
    entities: Option<Vec<Entity>>,
    tokens: Option<Vec<Token>>,
    entity_sentiments: Option<Vec<Entity>>,
    categories: Option<Vec<Category>>,
    failure: Option<String>,
    calls: AtomicUsize,
    documents: Mutex<Vec<Document>>,
}

impl MockLanguageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = Some(entities);
        self
    }

    pub fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_entity_sentiments(mut self, entities: Vec<Entity>) -> Self {
        self.entity_sentiments = Some(entities);
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = Some(categories);
        self
    }

    /// Every call fails with a network error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Documents received so far, in call order.
    pub fn documents(&self) -> Vec<Document> {
        self.documents
            .lock()
            .map(|docs| docs.clone())
            .unwrap_or_default()
    }

    fn record<T: Clone>(
        &self,
        document: &Document,
        result: &Option<T>,
    ) -> Result<Option<T>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut docs) = self.documents.lock() {
            docs.push(document.clone());
        }

        match &self.failure {
            Some(message) => Err(ProviderError::NetworkError(message.clone())),
            None => Ok(result.clone()),
        }
    }
}

#[async_trait]
impl LanguageProvider for MockLanguageProvider {
    async fn analyze_sentiment(
        &self,
        document: &Document,
    ) -> Result<Option<Sentiment>, ProviderError> {
        self.record(document, &self.sentiment)
    }

    async fn analyze_entities(
        &self,
        document: &Document,
    ) -> Result<Option<Vec<Entity>>, ProviderError> {
        self.record(document, &self.entities)
    }

    async fn analyze_syntax(&self, document: &Document) -> Result<Option<Vec<Token>>, ProviderError> {
        self.record(document, &self.tokens)
    }

    async fn analyze_entity_sentiment(
        &self,
        document: &Document,
    ) -> Result<Option<Vec<Entity>>, ProviderError> {
        self.record(document, &self.entity_sentiments)
    }

    async fn classify_text(
        &self,
        document: &Document,
    ) -> Result<Option<Vec<Category>>, ProviderError> {
        self.record(document, &self.categories)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.failure {
            Some(message) => Err(ProviderError::NotConfigured(message.clone())),
            None => Ok(()),
        }
    }
}
