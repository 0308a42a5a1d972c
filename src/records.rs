//! Validation of raw session-log lines and conversion into [`UsageRecord`]s.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{TokenCounts, UsageRecord};

/// Model name the logging tool writes for locally generated messages.
pub const SYNTHETIC_MODEL: &str = "<synthetic>";

fn usage_of(raw: &Value) -> Option<&Value> {
    raw.get("message")
        .and_then(|m| m.get("usage"))
        .filter(|u| u.is_object())
}

fn model_of(raw: &Value) -> Option<&str> {
    raw.get("message")
        .and_then(|m| m.get("model"))
        .or_else(|| raw.get("model"))
        .and_then(|v| v.as_str())
}

/// A line counts toward usage only if it carries numeric input/output token
/// counts, is not a synthetic message and is not flagged as an API error.
pub fn is_valid_usage_record(raw: &Value) -> bool {
    if !raw.is_object() {
        return false;
    }
    let Some(usage) = usage_of(raw) else {
        return false;
    };
    let numeric = |k: &str| usage.get(k).is_some_and(Value::is_number);
    if !numeric("input_tokens") || !numeric("output_tokens") {
        return false;
    }
    if model_of(raw) == Some(SYNTHETIC_MODEL) {
        return false;
    }
    raw.get("isApiErrorMessage").and_then(Value::as_bool) != Some(true)
}

/// Non-negative token count; integral floats such as `1200.0` are accepted.
pub(crate) fn token_count(usage: &Value, key: &str) -> u64 {
    match usage.get(key) {
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().map(|f| if f > 0.0 { f as u64 } else { 0 }))
            .unwrap_or(0),
        None => 0,
    }
}

fn string_field(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str).map(str::to_string)
}

/// Build a record from a raw line, or `None` if the line is not billable.
pub fn parse_usage_record(raw: &Value) -> Option<UsageRecord> {
    if !is_valid_usage_record(raw) {
        return None;
    }
    let usage = usage_of(raw)?;
    let timestamp = string_field(raw.get("timestamp"));
    let ts = timestamp
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc));
    Some(UsageRecord {
        message_id: string_field(raw.get("message").and_then(|m| m.get("id"))),
        request_id: string_field(raw.get("requestId")),
        timestamp,
        ts,
        model: model_of(raw).map(str::to_string),
        tokens: TokenCounts {
            input: token_count(usage, "input_tokens"),
            output: token_count(usage, "output_tokens"),
            cache_creation: token_count(usage, "cache_creation_input_tokens"),
            cache_read: token_count(usage, "cache_read_input_tokens"),
        },
    })
}
