//! Handler errors.

use crate::services::language::{Capability, ProviderError};
use crate::services::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use thiserror::Error;

pub const MISSING_FILENAME: &str = "Must supply a filename";
pub const MISSING_TEXT: &str = "Must supply text";
/// Client-facing detail for provider failures; the cause is only logged.
pub const UPSTREAM_FAILURE: &str = "language analysis request failed";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Required request input absent; raised before any outbound call.
    #[error("{0}")]
    MissingInput(&'static str),

    /// The service answered without a result for the capability.
    #[error("{}", .0.unavailable_message())]
    Unavailable(Capability),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Provider(e) => {
                tracing::error!(error = %e, "Natural Language API call failed");
                AppError::BadGateway(UPSTREAM_FAILURE.to_string())
            }
            other => AppError::InternalError(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        match self {
            AnalysisError::MissingInput(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
            AnalysisError::Unavailable(capability) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                capability.unavailable_message(),
            )
                .into_response(),
            other => AppError::from(other).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_become_bad_gateway() {
        let response =
            AnalysisError::Provider(ProviderError::RateLimited).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn provider_error_detail_stays_out_of_the_body() {
        let err: AppError =
            AnalysisError::Provider(ProviderError::NetworkError("secret-host:443".to_string()))
                .into();
        assert!(matches!(&err, AppError::BadGateway(msg) if msg == UPSTREAM_FAILURE));
        assert!(!err.to_string().contains("secret-host"));
    }

    #[test]
    fn storage_errors_become_internal_errors() {
        let response =
            AnalysisError::Storage(StorageError::NotFound("gs://b/x".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unavailable_displays_capability_message() {
        assert_eq!(
            AnalysisError::Unavailable(Capability::Syntax).to_string(),
            "Cannot analyze syntax"
        );
    }
}
