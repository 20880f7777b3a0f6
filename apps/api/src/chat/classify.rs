//! Maps failure records onto caller-facing errors.
//!
//! Provider failures are classified by matching known substrings in the
//! failure text: the provider does not expose one structured error taxonomy
//! across models. Upstream wording changes only need edits to the signal
//! lists below.

use crate::config::RunMode;
use crate::errors::AppError;

const TIMEOUT_SIGNALS: &[&str] = &["timeout", "timed out", "etimedout"];
const RATE_LIMIT_SIGNALS: &[&str] = &["rate limit", "rate_limit_exceeded"];
const TOO_LARGE_SIGNALS: &[&str] = &[
    "request too large",
    "tokens per minute",
    "context_length_exceeded",
];

/// Where in the pipeline a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Validation,
    Provider,
    Network,
}

/// Transient description of a failed request. Only used to pick the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub stage: FailureStage,
    pub detail: String,
}

impl FailureRecord {
    pub fn new(stage: FailureStage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    RateLimited,
    PayloadTooLarge,
    Other,
}

/// Case-insensitive match in precedence order: timeout, rate limit, too large.
pub fn classify_failure(detail: &str) -> FailureKind {
    let lower = detail.to_lowercase();
    let matches = |signals: &[&str]| signals.iter().any(|s| lower.contains(s));

    if matches(TIMEOUT_SIGNALS) {
        FailureKind::Timeout
    } else if matches(RATE_LIMIT_SIGNALS) {
        FailureKind::RateLimited
    } else if matches(TOO_LARGE_SIGNALS) {
        FailureKind::PayloadTooLarge
    } else {
        FailureKind::Other
    }
}

/// Selects the response for a failure. Raw detail leaves the process only in development.
pub fn into_app_error(record: FailureRecord, mode: RunMode) -> AppError {
    if record.stage == FailureStage::Validation {
        return AppError::Validation(record.detail);
    }

    match classify_failure(&record.detail) {
        FailureKind::Timeout => AppError::ProviderTimeout,
        FailureKind::RateLimited => AppError::RateLimited,
        FailureKind::PayloadTooLarge => AppError::PayloadTooLarge,
        FailureKind::Other => AppError::Provider {
            details: mode.exposes_details().then_some(record.detail),
        },
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::*;

    fn status_of(detail: &str) -> StatusCode {
        into_app_error(
            FailureRecord::new(FailureStage::Provider, detail),
            RunMode::Production,
        )
        .into_response()
        .status()
    }

    #[test]
    fn test_timeout_signals() {
        assert_eq!(classify_failure("Request timeout: operation timed out"), FailureKind::Timeout);
        assert_eq!(classify_failure("connect ETIMEDOUT 1.2.3.4:443"), FailureKind::Timeout);
        assert_eq!(status_of("request timed out"), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_rate_limit_signals() {
        assert_eq!(
            classify_failure("API error (status 429): slow down (rate_limit_exceeded)"),
            FailureKind::RateLimited
        );
        assert_eq!(status_of("Rate limit reached for model"), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_too_large_signals() {
        assert_eq!(classify_failure("Request too large for model"), FailureKind::PayloadTooLarge);
        assert_eq!(
            status_of("Limit 6000 tokens per minute, requested 9000"),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_table_precedence_for_overlapping_signals() {
        // Groq phrases TPM quota errors as rate limits; the rate-limit row wins.
        assert_eq!(
            classify_failure("Rate limit reached on tokens per minute (TPM)"),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify_failure("timeout while handling rate limit"),
            FailureKind::Timeout
        );
    }

    #[test]
    fn test_unknown_failure_is_internal_error() {
        assert_eq!(classify_failure("model decommissioned"), FailureKind::Other);
        assert_eq!(status_of("model decommissioned"), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_details_only_in_development() {
        let record = FailureRecord::new(FailureStage::Provider, "model decommissioned");

        match into_app_error(record.clone(), RunMode::Development) {
            AppError::Provider { details } => {
                assert_eq!(details.as_deref(), Some("model decommissioned"))
            }
            other => panic!("unexpected {other:?}"),
        }
        match into_app_error(record, RunMode::Production) {
            AppError::Provider { details } => assert!(details.is_none()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_validation_stage_is_bad_request() {
        let err = into_app_error(
            FailureRecord::new(FailureStage::Validation, "rate limit in the question"),
            RunMode::Production,
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
