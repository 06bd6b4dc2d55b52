use crate::config::DocumentSource;
use crate::error::{AnalysisError, MISSING_FILENAME, MISSING_TEXT};
use crate::services::document::EncodingType;
use crate::services::language::{ProviderError, Sentiment};
use crate::services::metrics::{record_analysis, AnalysisOutcome};
use crate::services::{build_document, Capability, Document};
use crate::shaping::{self, CategoryBody, EntityBody, EntitySentimentBody, SentimentBody, TokenBody};
use crate::startup::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct FileParams {
    #[validate(required, length(min = 1))]
    pub filename: Option<String>,
}

/// A malformed query string is treated like a missing filename.
pub type FileQuery = Result<Query<FileParams>, QueryRejection>;

#[derive(Debug, Deserialize, Validate)]
pub struct TextRequest {
    #[validate(required, length(min = 1))]
    pub text: Option<String>,
}

fn required_filename(params: FileQuery) -> Result<String, AnalysisError> {
    let Query(params) = params.map_err(|e| {
        tracing::debug!(error = %e, "Unreadable query string");
        AnalysisError::MissingInput(MISSING_FILENAME)
    })?;
    params
        .validate()
        .map_err(|_| AnalysisError::MissingInput(MISSING_FILENAME))?;
    params
        .filename
        .ok_or(AnalysisError::MissingInput(MISSING_FILENAME))
}

fn required_text(payload: Result<Json<TextRequest>, JsonRejection>) -> Result<String, AnalysisError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Unreadable text payload");
        AnalysisError::MissingInput(MISSING_TEXT)
    })?;
    request
        .validate()
        .map_err(|_| AnalysisError::MissingInput(MISSING_TEXT))?;
    request.text.ok_or(AnalysisError::MissingInput(MISSING_TEXT))
}

/// Produce the document for a stored object, reading it first unless the
/// service is configured to pass a storage reference through.
async fn file_document(state: &AppState, filename: &str) -> Result<Document, AnalysisError> {
    match state.document_source {
        DocumentSource::Fetch => {
            let text = state.storage.read_text(filename).await.map_err(|e| {
                tracing::error!(
                    bucket = %state.storage.bucket(),
                    filename = %filename,
                    error = %e,
                    "Failed to read object"
                );
                e
            })?;
            Ok(build_document(text))
        }
        DocumentSource::Reference => Ok(Document::from_storage(state.storage.bucket(), filename)),
    }
}

/// An absent result field is an analysis failure for `capability`.
fn available<T>(
    capability: Capability,
    result: Result<Option<T>, ProviderError>,
) -> Result<T, AnalysisError> {
    match result? {
        Some(value) => Ok(value),
        None => {
            tracing::warn!(capability = %capability, "Analysis returned no result");
            Err(AnalysisError::Unavailable(capability))
        }
    }
}

fn observe<T>(capability: Capability, result: Result<T, AnalysisError>) -> Result<T, AnalysisError> {
    let outcome = match &result {
        Ok(_) => Some(AnalysisOutcome::Success),
        Err(AnalysisError::MissingInput(_)) => None,
        Err(AnalysisError::Unavailable(_)) => Some(AnalysisOutcome::Unavailable),
        Err(_) => Some(AnalysisOutcome::Error),
    };
    if let Some(outcome) = outcome {
        record_analysis(capability, outcome);
    }
    result
}

async fn text_sentiment(
    state: &AppState,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Sentiment, AnalysisError> {
    let text = required_text(payload)?;
    let document = build_document(text.as_str());
    let sentiment = available(
        Capability::Sentiment,
        state.language.analyze_sentiment(&document).await,
    )?;

    tracing::debug!(text = %text, "Analyzed text");
    tracing::info!(
        text_len = text.len(),
        score = ?sentiment.score,
        magnitude = ?sentiment.magnitude,
        "Sentiment analyzed"
    );
    Ok(sentiment)
}

async fn file_sentiment(state: &AppState, params: FileQuery) -> Result<Sentiment, AnalysisError> {
    let filename = required_filename(params)?;
    let document = file_document(state, &filename).await?;
    let sentiment = available(
        Capability::Sentiment,
        state.language.analyze_sentiment(&document).await,
    )?;

    tracing::info!(
        filename = %filename,
        score = ?sentiment.score,
        magnitude = ?sentiment.magnitude,
        "Sentiment analyzed"
    );
    Ok(sentiment)
}

async fn file_entities(state: &AppState, params: FileQuery) -> Result<Vec<EntityBody>, AnalysisError> {
    let filename = required_filename(params)?;
    let document = file_document(state, &filename).await?;
    let entities = available(
        Capability::Entities,
        state.language.analyze_entities(&document).await,
    )?;

    tracing::info!(filename = %filename, count = entities.len(), "Entities analyzed");
    Ok(shaping::shape_entities(entities))
}

async fn file_syntax(state: &AppState, params: FileQuery) -> Result<Vec<TokenBody>, AnalysisError> {
    let filename = required_filename(params)?;
    let document = file_document(state, &filename)
        .await?
        .with_encoding(EncodingType::Utf8);
    let tokens = available(
        Capability::Syntax,
        state.language.analyze_syntax(&document).await,
    )?;

    tracing::info!(filename = %filename, count = tokens.len(), "Syntax analyzed");
    Ok(shaping::shape_tokens(tokens))
}

async fn file_entity_sentiment(
    state: &AppState,
    params: FileQuery,
) -> Result<Vec<EntitySentimentBody>, AnalysisError> {
    let filename = required_filename(params)?;
    let document = file_document(state, &filename).await?;
    let entities = available(
        Capability::EntitySentiment,
        state.language.analyze_entity_sentiment(&document).await,
    )?;

    tracing::info!(filename = %filename, count = entities.len(), "Entity sentiment analyzed");
    Ok(shaping::shape_entity_sentiments(entities))
}

async fn file_categories(
    state: &AppState,
    params: FileQuery,
) -> Result<Vec<CategoryBody>, AnalysisError> {
    let filename = required_filename(params)?;
    let document = file_document(state, &filename).await?;
    let categories = available(
        Capability::Classification,
        state.language.classify_text(&document).await,
    )?;

    tracing::info!(filename = %filename, count = categories.len(), "Text classified");
    Ok(shaping::shape_categories(categories))
}

pub async fn sentiment_by_text(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<SentimentBody>, AnalysisError> {
    let sentiment = observe(Capability::Sentiment, text_sentiment(&state, payload).await)?;
    Ok(Json(shaping::sentiment_json(&sentiment)))
}

/// Legacy text shape: `Sentiment = S; magnitude = M`.
pub async fn sentiment_by_text_v1(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<String, AnalysisError> {
    let sentiment = observe(Capability::Sentiment, text_sentiment(&state, payload).await)?;
    Ok(shaping::sentiment_text(&sentiment))
}

pub async fn sentiment_by_file(
    State(state): State<AppState>,
    params: FileQuery,
) -> Result<Json<SentimentBody>, AnalysisError> {
    let sentiment = observe(Capability::Sentiment, file_sentiment(&state, params).await)?;
    Ok(Json(shaping::sentiment_json(&sentiment)))
}

/// Legacy text shape: `Sentiment = S; magnitude = M`.
pub async fn sentiment_by_file_v1(
    State(state): State<AppState>,
    params: FileQuery,
) -> Result<String, AnalysisError> {
    let sentiment = observe(Capability::Sentiment, file_sentiment(&state, params).await)?;
    Ok(shaping::sentiment_text(&sentiment))
}

pub async fn entities_by_file(
    State(state): State<AppState>,
    params: FileQuery,
) -> Result<Json<Vec<EntityBody>>, AnalysisError> {
    observe(Capability::Entities, file_entities(&state, params).await).map(Json)
}

pub async fn syntax_by_file(
    State(state): State<AppState>,
    params: FileQuery,
) -> Result<Json<Vec<TokenBody>>, AnalysisError> {
    observe(Capability::Syntax, file_syntax(&state, params).await).map(Json)
}

pub async fn entity_sentiment_by_file(
    State(state): State<AppState>,
    params: FileQuery,
) -> Result<Json<Vec<EntitySentimentBody>>, AnalysisError> {
    observe(
        Capability::EntitySentiment,
        file_entity_sentiment(&state, params).await,
    )
    .map(Json)
}

pub async fn classify_by_file(
    State(state): State<AppState>,
    params: FileQuery,
) -> Result<Json<Vec<CategoryBody>>, AnalysisError> {
    observe(Capability::Classification, file_categories(&state, params).await).map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_required_and_non_empty() {
        assert!(matches!(
            required_filename(Ok(Query(FileParams { filename: None }))),
            Err(AnalysisError::MissingInput(MISSING_FILENAME))
        ));
        assert!(matches!(
            required_filename(Ok(Query(FileParams {
                filename: Some(String::new())
            }))),
            Err(AnalysisError::MissingInput(MISSING_FILENAME))
        ));
        assert_eq!(
            required_filename(Ok(Query(FileParams {
                filename: Some("a.txt".to_string())
            })))
            .unwrap(),
            "a.txt"
        );
    }

    #[test]
    fn absent_result_is_unavailable() {
        let result: Result<Vec<u8>, _> = available(Capability::Syntax, Ok(None));
        assert!(matches!(
            result,
            Err(AnalysisError::Unavailable(Capability::Syntax))
        ));

        let empty: Result<Vec<u8>, _> = available(Capability::Syntax, Ok(Some(vec![])));
        assert!(empty.unwrap().is_empty());
    }
}
