use crate::{extract::IngestError, prompt::PromptError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use easeai_sdk::LanguageModelError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced by the HTTP handlers.
///
/// The `Display` text is what the client sees; upstream detail stays in the
/// `source` and is only logged.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed client input.
    #[error("{0}")]
    Validation(String),
    /// Valid input, but the state it depends on does not exist yet.
    #[error("{0}")]
    Precondition(String),
    #[error("{message}")]
    Ingest {
        message: &'static str,
        #[source]
        source: IngestError,
    },
    #[error("{message}")]
    Generation {
        message: &'static str,
        #[source]
        source: LanguageModelError,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn generation(message: &'static str, source: LanguageModelError) -> Self {
        Self::Generation { message, source }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Precondition(_) => StatusCode::BAD_REQUEST,
            Self::Ingest { .. } | Self::Generation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PromptError> for ApiError {
    fn from(error: PromptError) -> Self {
        match error {
            PromptError::MissingQuestion => Self::Validation(error.to_string()),
            PromptError::MissingDocument => Self::Precondition(error.to_string()),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::EmptyPayload | IngestError::PayloadTooLarge { .. } => {
                Self::Validation(error.to_string())
            }
            IngestError::Extraction(_) | IngestError::Storage(_) => Self::Ingest {
                message: "Failed to process document.",
                source: error,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Validation(message) | Self::Precondition(message) => {
                tracing::warn!(%status, reason = %message, "request rejected");
            }
            Self::Ingest { message, source } => {
                tracing::error!(%status, error = %source, "{message}");
            }
            Self::Generation { message, source } => {
                tracing::error!(
                    %status,
                    kind = source.kind().as_str(),
                    error = %source,
                    "{message}"
                );
            }
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
