//! Analysis dispatcher.
//!
//! Each capability of the natural-language service is one method on
//! [`LanguageProvider`]. Implementations return `Ok(None)` when the service
//! answered but the field for the requested capability was absent, which
//! the handlers report as an analysis failure; transport and API failures
//! are `Err`.

pub mod google;
pub mod mock;

use crate::services::document::Document;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// One analysis function offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Sentiment,
    Entities,
    Syntax,
    EntitySentiment,
    Classification,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Sentiment => "sentiment",
            Capability::Entities => "entities",
            Capability::Syntax => "syntax",
            Capability::EntitySentiment => "entity_sentiment",
            Capability::Classification => "classification",
        }
    }

    /// Body sent when the service returned no usable result.
    pub fn unavailable_message(&self) -> &'static str {
        match self {
            Capability::Sentiment => "Cannot analyze sentiment",
            Capability::Entities => "Cannot analyze entity",
            Capability::Syntax => "Cannot analyze syntax",
            Capability::EntitySentiment => "Cannot analyze entity sentiment",
            Capability::Classification => "Cannot classify article",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document- or entity-level sentiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Polarity in [-1, 1].
    pub score: Option<f64>,
    /// Overall strength, >= 0.
    pub magnitude: Option<f64>,
}

impl Sentiment {
    pub fn new(score: f64, magnitude: f64) -> Self {
        Self {
            score: Some(score),
            magnitude: Some(magnitude),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    #[default]
    Unknown,
    Person,
    Location,
    Organization,
    Event,
    WorkOfArt,
    ConsumerGood,
    Other,
    PhoneNumber,
    Address,
    Date,
    Number,
    Price,
    /// A category this build does not know about, kept verbatim.
    Unrecognized(String),
}

impl EntityType {
    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Unknown => "UNKNOWN",
            EntityType::Person => "PERSON",
            EntityType::Location => "LOCATION",
            EntityType::Organization => "ORGANIZATION",
            EntityType::Event => "EVENT",
            EntityType::WorkOfArt => "WORK_OF_ART",
            EntityType::ConsumerGood => "CONSUMER_GOOD",
            EntityType::Other => "OTHER",
            EntityType::PhoneNumber => "PHONE_NUMBER",
            EntityType::Address => "ADDRESS",
            EntityType::Date => "DATE",
            EntityType::Number => "NUMBER",
            EntityType::Price => "PRICE",
            EntityType::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for EntityType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "UNKNOWN" => EntityType::Unknown,
            "PERSON" => EntityType::Person,
            "LOCATION" => EntityType::Location,
            "ORGANIZATION" => EntityType::Organization,
            "EVENT" => EntityType::Event,
            "WORK_OF_ART" => EntityType::WorkOfArt,
            "CONSUMER_GOOD" => EntityType::ConsumerGood,
            "OTHER" => EntityType::Other,
            "PHONE_NUMBER" => EntityType::PhoneNumber,
            "ADDRESS" => EntityType::Address,
            "DATE" => EntityType::Date,
            "NUMBER" => EntityType::Number,
            "PRICE" => EntityType::Price,
            _ => EntityType::Unrecognized(value),
        }
    }
}

impl From<EntityType> for String {
    fn from(value: EntityType) -> Self {
        match value {
            EntityType::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub entity_type: EntityType,
    /// Importance in [0, 1]; the service may omit it.
    pub salience: Option<f64>,
    /// Only populated by entity-sentiment analysis.
    pub sentiment: Option<Sentiment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpan {
    pub content: Option<String>,
    pub begin_offset: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartOfSpeech {
    pub tag: Option<String>,
    pub case: Option<String>,
    pub tense: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub text: Option<TextSpan>,
    pub part_of_speech: Option<PartOfSpeech>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: String,
    /// Confidence in [0, 1].
    pub confidence: Option<f64>,
}

/// Natural-language analysis backend.
#[async_trait]
pub trait LanguageProvider: Send + Sync {
    async fn analyze_sentiment(&self, document: &Document)
        -> Result<Option<Sentiment>, ProviderError>;

    async fn analyze_entities(
        &self,
        document: &Document,
    ) -> Result<Option<Vec<Entity>>, ProviderError>;

    async fn analyze_syntax(&self, document: &Document)
        -> Result<Option<Vec<Token>>, ProviderError>;

    /// Entities with their `sentiment` populated.
    async fn analyze_entity_sentiment(
        &self,
        document: &Document,
    ) -> Result<Option<Vec<Entity>>, ProviderError>;

    async fn classify_text(
        &self,
        document: &Document,
    ) -> Result<Option<Vec<Category>>, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
