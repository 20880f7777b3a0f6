use serde_json::Value;

/// A chat request that passed validation. Both strings are non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub question: String,
    pub docs: String,
    /// Optional attribution for usage records. Never required.
    pub project_id: Option<String>,
}

pub const NOT_AN_OBJECT: &str = "Request body must be a JSON object";
pub const QUESTION_REQUIRED: &str = "Question is required and must be a non-empty string";
pub const DOCS_REQUIRED: &str =
    "Documentation content is required and must be a non-empty string";

/// Parses raw body bytes, then validates. Anything that is not JSON is "not an object".
pub fn parse_chat_body(body: &[u8], max_question_len: usize) -> Result<ChatRequest, String> {
    let value: Value = serde_json::from_slice(body).map_err(|_| NOT_AN_OBJECT.to_string())?;
    validate_chat_request(&value, max_question_len)
}

/// Validates a parsed body. Rules apply in order and the first failure wins:
///
/// 1. body is a JSON object
/// 2. `question` is a string that is non-empty after trimming
/// 3. `docs` is a string that is non-empty after trimming
/// 4. `question` has at most `max_question_len` characters
pub fn validate_chat_request(body: &Value, max_question_len: usize) -> Result<ChatRequest, String> {
    let obj = body.as_object().ok_or_else(|| NOT_AN_OBJECT.to_string())?;

    let question =
        non_blank_str(obj.get("question")).ok_or_else(|| QUESTION_REQUIRED.to_string())?;
    let docs = non_blank_str(obj.get("docs")).ok_or_else(|| DOCS_REQUIRED.to_string())?;

    if question.chars().count() > max_question_len {
        return Err(format!(
            "Question too long. Maximum {max_question_len} characters allowed"
        ));
    }

    let project_id = obj
        .get("project_id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ChatRequest {
        question: question.to_string(),
        docs: docs.to_string(),
        project_id,
    })
}

fn non_blank_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
