use serde_json::Value;

/// Cap on the captured size of any request or response body.
pub const MAX_BODY_BYTES: usize = 102_400;

/// Appended when a body was cut at [`MAX_BODY_BYTES`].
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Renders a configured body value for the trace: strings pass through,
/// structured values serialize to JSON, and a serialization failure yields a
/// placeholder instead of propagating.
#[must_use]
pub fn render_body_value(body: &Value) -> Option<String> {
    match body {
        Value::Null => None,
        Value::String(text) => Some(truncate_with_marker(text)),
        value @ (Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_)) => {
            Some(match serde_json::to_string(value) {
                Ok(json) => truncate_with_marker(&json),
                Err(err) => format!("[Error serializing body: {err}]"),
            })
        }
    }
}

/// Renders raw response bytes for the trace, lossily when not valid UTF-8.
#[must_use]
pub fn render_body_bytes(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    Some(truncate_with_marker(&String::from_utf8_lossy(bytes)))
}

/// Caps `text` at [`MAX_BODY_BYTES`] on a character boundary, appending the
/// truncation marker when anything was cut.
#[must_use]
pub fn truncate_with_marker(text: &str) -> String {
    if text.len() <= MAX_BODY_BYTES {
        return text.to_owned();
    }
    let prefix = floor_char_boundary(text, MAX_BODY_BYTES);
    let mut capped = String::with_capacity(prefix.len().saturating_add(TRUNCATION_MARKER.len()));
    capped.push_str(prefix);
    capped.push_str(TRUNCATION_MARKER);
    capped
}

fn floor_char_boundary(text: &str, max_bytes: usize) -> &str {
    let mut end = max_bytes.min(text.len());
    while end > 0 && !text.is_char_boundary(end) {
        end = end.saturating_sub(1);
    }
    text.get(..end).unwrap_or("")
}
