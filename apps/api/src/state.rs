use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::{CompletionProvider, ModelTier};

/// Shared application state injected into all route handlers via Axum extractors.
/// Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    /// `None` when `DATABASE_URL` is unset; project and stats routes then answer 503.
    pub db: Option<PgPool>,
    /// `None` when no provider key is configured; chat then answers 500.
    pub llm: Option<Arc<dyn CompletionProvider>>,
    pub model_tiers: Arc<[ModelTier]>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        config: Config,
        llm: Option<Arc<dyn CompletionProvider>>,
        db: Option<PgPool>,
    ) -> Self {
        Self {
            db,
            llm,
            model_tiers: config.model_tiers().into(),
            config,
        }
    }

    pub fn require_db(&self) -> Result<&PgPool, AppError> {
        self.db.as_ref().ok_or(AppError::PersistenceUnavailable)
    }
}
