//! Request-level errors and their HTTP representation.
//!
//! Errors are rendered as `text/plain` bodies holding the message followed by
//! a newline, with the status taken from the upstream failure when there is one.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::domain::metrics_api::ApiError;
use crate::domain::pipeline::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed `Authorization` header.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    /// Non-success answer from the upstream API; the status is passed through.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The upstream API could not be reached.
    #[error("{0}")]
    BadGateway(String),

    /// The request deadline passed before aggregation finished.
    #[error("request deadline exceeded")]
    Timeout,

    /// The response could not be serialized.
    #[error("{0}")]
    Encoding(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Encoding(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Upstream { status, message } => AppError::Upstream { status, message },
            ApiError::Transport(message) => AppError::BadGateway(message),
            ApiError::Decode(message) => AppError::Internal(message),
            ApiError::Cancelled => AppError::Timeout,
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Listing(e) | PipelineError::Job { error: e, .. } => e.into(),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            format!("{}\n", self),
        )
            .into_response()
    }
}
