// Shared prompt fragments used by every service that calls the provider.
// Each service keeps its own prompts.rs alongside it for the rest.

/// Grounding rule appended to every system prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
Answer ONLY from the provided documentation. \
If the documentation doesn't contain enough information to answer the question, say so clearly. \
Do NOT invent models, fields, endpoints or behaviour that the documentation does not describe.";

/// Returned in place of an answer when the provider responds without any content.
pub const NO_CONTENT_PLACEHOLDER: &str =
    "I apologize, but I was unable to generate a response. Please try again.";
