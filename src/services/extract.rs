//! Pull structured payloads out of conversational AI replies.
//!
//! A reply may carry `JSON_DATA: {...}` or the same object inside a fenced
//! block (```` ```json ... ``` ````). Anything that fails to decode means
//! "no structured result"; the reply itself is never altered in that case.

use serde_json::Value;

pub const DATA_MARKER: &str = "JSON_DATA:";

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub value: Value,
    /// Reply text with the marker and payload removed.
    pub remainder: String,
}

/// Find the object introduced by [`DATA_MARKER`] (case-insensitive).
pub fn extract_marked_json(text: &str) -> Option<Extracted> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let marker_at = text
        .to_ascii_lowercase()
        .find(&DATA_MARKER.to_ascii_lowercase())?;
    let after_marker = marker_at + DATA_MARKER.len();

    let tail = &text[after_marker..];
    let body = tail.trim_start();
    let body_at = after_marker + (tail.len() - body.len());

    let (span, consumed) = if body.starts_with("```") {
        fenced_span(body)?
    } else {
        braced_span(body)?
    };

    let value: Value = serde_json::from_str(span).ok()?;
    if !value.is_object() {
        return None;
    }

    let end = body_at + consumed;
    let remainder = format!("{}{}", &text[..marker_at], &text[end..])
        .trim()
        .to_string();

    Some(Extracted { value, remainder })
}

/// Parse a reply that should be nothing but a JSON object, possibly fenced.
pub fn parse_json_reply(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    let span = if trimmed.starts_with("```") {
        fenced_span(trimmed)?.0
    } else {
        trimmed
    };
    serde_json::from_str::<Value>(span)
        .ok()
        .filter(Value::is_object)
}

/// Inner text of a fence opening at the start of `body`, plus the bytes
/// consumed through the closing fence.
fn fenced_span(body: &str) -> Option<(&str, usize)> {
    let after_open = body.find('\n')? + 1;
    let close = body[after_open..].find("```")?;
    let inner = body[after_open..after_open + close].trim();
    Some((inner, after_open + close + 3))
}

/// From the opening `{` at the start of `body` to the last `}`.
fn braced_span(body: &str) -> Option<(&str, usize)> {
    if !body.starts_with('{') {
        return None;
    }
    let close = body.rfind('}')?;
    Some((&body[..=close], close + 1))
}
