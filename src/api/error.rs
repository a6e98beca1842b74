//! Mapping of service errors onto HTTP responses.

use crate::{
    accounts::{AccountError, TokenError},
    processing::{IngestError, QueryError, ValidationError},
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Every failure a handler can surface, mapped to one HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request parameters or body were rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Post ingestion failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Radius or threshold query failed.
    #[error(transparent)]
    Query(#[from] QueryError),
    /// Signup or login failed.
    #[error(transparent)]
    Account(#[from] AccountError),
    /// Bearer token missing or rejected.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ApiError {
    /// Status code returned to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::Ingest(IngestError::Validation(_))
            | Self::Query(QueryError::Validation(_))
            | Self::Account(AccountError::Validation(_))
            | Self::Account(AccountError::UsernameTaken(_)) => StatusCode::BAD_REQUEST,
            Self::Account(AccountError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Token(TokenError::Signing(_)) | Self::Account(AccountError::Token(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::Ingest(_) | Self::Query(_) | Self::Account(AccountError::Store(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message; server-side failures never leak adapter detail.
    fn public_message(&self) -> String {
        match self {
            Self::Ingest(IngestError::Validation(_))
            | Self::Query(QueryError::Validation(_))
            | Self::Account(AccountError::Validation(_)) => self.to_string(),
            Self::Ingest(_) => "Failed to save post".to_string(),
            Self::Query(_) => "Failed to read posts".to_string(),
            Self::Account(AccountError::Store(_)) => "Failed to access users".to_string(),
            Self::Account(AccountError::Token(_)) | Self::Token(TokenError::Signing(_)) => {
                "Failed to generate token".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::info!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, self.public_message()).into_response()
    }
}
