//! Pull a JSON object out of a free-form model response.

use serde_json::Value;
use tracing::debug;

use crate::error::ResponseParseError;

const FENCE: &str = "```";
const SNIPPET_CHARS: usize = 80;

/// Parse the JSON object embedded in a vision response.
///
/// Looks for a fenced code block, then the outermost `{...}` span, then falls
/// back to the whole trimmed text. If that does not parse, the text gets one
/// cleanup pass (fence markers, a leading `json` tag and blank lines removed)
/// and is parsed again. There is no third attempt.
pub fn parse_vision_response(raw: &str) -> Result<Value, ResponseParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ResponseParseError::NoPayload);
    }

    let candidate = locate_payload(trimmed);
    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => value,
        Err(first) => {
            debug!(error = %first, "Vision response did not parse, retrying after cleanup");
            let cleaned = cleanup(trimmed);
            let retry = object_span(&cleaned).unwrap_or(&cleaned);
            serde_json::from_str::<Value>(retry).map_err(|source| {
                ResponseParseError::InvalidJson {
                    source,
                    snippet: snippet(retry),
                }
            })?
        }
    };

    match value {
        Value::Object(_) => Ok(value),
        other => Err(ResponseParseError::NotAnObject {
            found: json_type(&other),
        }),
    }
}

fn locate_payload(text: &str) -> &str {
    fenced_block(text)
        .or_else(|| object_span(text))
        .unwrap_or(text)
}

/// Interior of the first fenced block, skipping a language tag if present.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE)? + FENCE.len();
    let after = &text[start..];

    // A tag is a single word running up to the end of the opening line
    let body_start = match after.find('\n') {
        Some(newline) if after[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            newline + 1
        }
        _ => 0,
    };

    let body = &after[body_start..];
    let end = body.find(FENCE)?;
    Some(body[..end].trim())
}

/// First `{` through last `}`.
fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn cleanup(text: &str) -> String {
    let without_fences = text.replace(FENCE, "");
    let body = without_fences.trim_start();
    let body = match body.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &body[4..],
        _ => body,
    };

    body.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
