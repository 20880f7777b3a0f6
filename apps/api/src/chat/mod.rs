// Documentation Q&A pipeline.
// Flow: validation → truncation → prompts → invoker → classify (on failure).
// All provider calls go through llm_client; nothing here speaks HTTP to the provider.

pub mod classify;
pub mod handlers;
pub mod invoker;
pub mod prompts;
pub mod truncation;
pub mod validation;
