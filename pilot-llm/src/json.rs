//! Recovery of JSON payloads from model replies.
//!
//! Models asked for "only JSON" still wrap it in prose or code fences now and
//! then. Both helpers try a direct parse first and fall back to the widest
//! embedded `{...}` / `[...]` span.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static OBJECT_SPAN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").ok());
static ARRAY_SPAN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\[[\s\S]*\]").ok());

/// Parse a reply that should contain a JSON object.
pub fn parse_json_object(reply: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(reply.trim()) {
        return Some(map);
    }
    let span = embedded_span(reply, OBJECT_SPAN.as_ref())?;
    match serde_json::from_str::<Value>(span).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Parse a reply that should contain a JSON array.
pub fn parse_json_array(reply: &str) -> Option<Vec<Value>> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(reply.trim()) {
        return Some(items);
    }
    let span = embedded_span(reply, ARRAY_SPAN.as_ref())?;
    match serde_json::from_str::<Value>(span).ok()? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

fn embedded_span<'a>(text: &'a str, pattern: Option<&Regex>) -> Option<&'a str> {
    pattern?.find(text).map(|m| m.as_str())
}
