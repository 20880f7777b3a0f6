//! Prompt construction for documentation Q&A.

use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::PromptPayload;

/// Role description for the documentation assistant. The grounding rule is appended at build time.
pub const CHAT_SYSTEM: &str = "\
You are an AI assistant specialized in explaining Django REST API projects.
You have been provided with comprehensive documentation about a Django project including models, serializers, views, and relationships.

Your task is to answer questions about this specific Django project.

Guidelines:
- Be accurate and specific to the provided documentation
- Use technical terms appropriately but explain complex concepts clearly
- Reference specific models, fields, or relationships when relevant
- If asked about code implementation, provide practical examples when possible
- Keep responses concise but comprehensive

The documentation includes:
- Django models with fields, relationships, and methods
- DRF serializers with field configurations
- Views and ViewSets with their functionality
- Database relationships and constraints";

/// Leading line of the user message; question and documentation follow it.
pub const CHAT_PROMPT_PREAMBLE: &str =
    "Based on the following Django project documentation, please answer this question:";

/// Builds the `[system, user]` pair. `bounded_docs` must already be truncated.
pub fn build_prompt(question: &str, bounded_docs: &str) -> PromptPayload {
    let system = format!("{CHAT_SYSTEM}\n\n{GROUNDING_INSTRUCTION}");
    let user = format!(
        "{CHAT_PROMPT_PREAMBLE}\n\nQuestion: {question}\n\nDocumentation:\n{bounded_docs}"
    );
    PromptPayload::new(system, user)
}
