use axum::{
    extract::rejection::{BytesRejection, JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant renders as `{"error": <message>, "details"?: <text>}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid API key")]
    Unauthorized,

    #[error("Method not allowed. Use POST.")]
    MethodNotAllowed,

    /// The provider credential is missing. Not retryable by the caller.
    #[error("Server configuration error")]
    Misconfigured,

    #[error("Request timeout. Please try again with a shorter question or documentation.")]
    ProviderTimeout,

    #[error("Rate limit exceeded. Your documentation is too large for the current provider quota. Please try again later or with a smaller Django project.")]
    RateLimited,

    #[error("Documentation too large. Please try with a smaller Django project or break your question into smaller parts.")]
    PayloadTooLarge,

    /// Every tier failed for an unrecognized reason.
    #[error("Internal server error. Please try again later.")]
    Provider { details: Option<String> },

    #[error("{0}")]
    NotFound(String),

    #[error("Persistence is not configured")]
    PersistenceUnavailable,

    #[error("Internal server error")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ProviderTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Provider { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PersistenceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Extractor rejections keep their 413; anything else is a malformed request.
fn from_rejection(status: StatusCode, text: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(text)
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Misconfigured => {
                tracing::error!("GROQ_API_KEY environment variable is not set")
            }
            AppError::Database(e) => tracing::error!("Database error: {e}"),
            AppError::Provider { details } => {
                tracing::error!("Provider error: {}", details.as_deref().unwrap_or("<hidden>"))
            }
            _ => {}
        }

        let body = ErrorBody {
            error: self.to_string(),
            details: match self {
                AppError::Provider { details } => details,
                _ => None,
            },
        };

        (status, Json(body)).into_response()
    }
}
