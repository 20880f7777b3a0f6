//! Completion invoker. Tries each model tier once, in order.
//!
//! Tiers run sequentially: the fallback is only called after the primary's
//! failure is observed. There is no backoff and no third attempt beyond the
//! configured tiers.

use tracing::{error, warn};

use crate::chat::classify::{FailureRecord, FailureStage};
use crate::llm_client::prompts::NO_CONTENT_PLACEHOLDER;
use crate::llm_client::{CompletionProvider, ModelTier, PromptPayload};

/// A successful answer and the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub answer: String,
    pub model: String,
    pub tokens_used: u32,
}

/// Returns the first tier's answer that succeeds.
/// When every tier fails, the last failure becomes the terminal record.
pub async fn invoke_with_fallback(
    provider: &dyn CompletionProvider,
    tiers: &[ModelTier],
    prompt: &PromptPayload,
) -> Result<Completion, FailureRecord> {
    let mut last_failure: Option<FailureRecord> = None;

    for (attempt, tier) in tiers.iter().enumerate() {
        match provider.complete(tier, prompt).await {
            Ok(output) => {
                let answer = output
                    .text
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| NO_CONTENT_PLACEHOLDER.to_string());
                return Ok(Completion {
                    answer,
                    model: output.model,
                    tokens_used: output.total_tokens,
                });
            }
            Err(e) => {
                if attempt + 1 < tiers.len() {
                    warn!("Model {} failed, falling back: {e}", tier.model);
                }
                last_failure = Some(FailureRecord::new(e.stage(), e.to_string()));
            }
        }
    }

    let failure = last_failure.unwrap_or_else(|| {
        FailureRecord::new(FailureStage::Provider, "no model tiers configured")
    });
    error!(
        "All {} model tiers failed: {}",
        tiers.len(),
        failure.detail
    );
    Err(failure)
}
