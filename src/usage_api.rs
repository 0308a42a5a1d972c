//! Normalization of remote usage, overage and prepaid-credit responses.
//!
//! The raw JSON is produced by an external collaborator (the page session that
//! intercepts these responses); everything here is pure and infallible.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{OverageSnapshot, PrepaidSnapshot, UsageSnapshot, UsageWindow};
use crate::schema::{
    EndpointKind, OVERAGE_SCHEMA, PREPAID_BALANCE_FIELDS, PREPAID_SCHEMA, USAGE_SCHEMA, extract,
    resolve_first,
};

const DEFAULT_CURRENCY: &str = "USD";

fn as_number(v: Option<&Value>) -> f64 {
    match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn cents_to_major(v: Option<&Value>) -> f64 {
    as_number(v) / 100.0
}

/// The extracted currency as given, including "". Non-string values fall back to USD.
fn as_currency(v: Option<&Value>) -> String {
    v.and_then(Value::as_str)
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string()
}

fn as_time(v: Option<&Value>) -> Option<DateTime<Utc>> {
    v.and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// `None` when overage billing is disabled; a zero limit still yields a
/// snapshot with `percent == 0`.
pub fn process_overage_data(raw: &Value) -> Option<OverageSnapshot> {
    let fields = extract(raw, OVERAGE_SCHEMA);
    if !fields
        .get("enabled")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return None;
    }
    let limit = cents_to_major(fields.get("limit"));
    let used = cents_to_major(fields.get("used"));
    let percent = if limit == 0.0 {
        0
    } else {
        (used / limit * 100.0).round() as u32
    };
    Some(OverageSnapshot {
        limit,
        used,
        currency: as_currency(fields.get("currency")),
        percent,
        out_of_credits: fields
            .get("out_of_credits")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

/// `None` when the resolved balance is exactly zero, which the remote side
/// also reports for accounts without a prepaid plan.
pub fn process_prepaid_data(raw: &Value) -> Option<PrepaidSnapshot> {
    let fields = extract(raw, PREPAID_SCHEMA);
    let balance_cents = as_number(resolve_first(raw, PREPAID_BALANCE_FIELDS).as_ref());
    if balance_cents == 0.0 {
        return None;
    }
    Some(PrepaidSnapshot {
        balance: balance_cents / 100.0,
        currency: as_currency(fields.get("currency")),
    })
}

fn window(fields: &Map<String, Value>, name: &str) -> UsageWindow {
    let group = fields.get(name);
    UsageWindow {
        utilization: as_number(group.and_then(|g| g.get("utilization"))),
        resets_at: as_time(group.and_then(|g| g.get("resets_at"))),
    }
}

pub fn process_usage_data(raw: &Value) -> UsageSnapshot {
    let fields = extract(raw, USAGE_SCHEMA);
    UsageSnapshot {
        five_hour: window(&fields, "five_hour"),
        seven_day: window(&fields, "seven_day"),
        seven_day_opus: window(&fields, "seven_day_opus"),
        seven_day_sonnet: window(&fields, "seven_day_sonnet"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ProcessedResponse {
    Usage(UsageSnapshot),
    Overage(Option<OverageSnapshot>),
    Prepaid(Option<PrepaidSnapshot>),
}

pub fn process_response(kind: EndpointKind, raw: &Value) -> ProcessedResponse {
    match kind {
        EndpointKind::Usage => ProcessedResponse::Usage(process_usage_data(raw)),
        EndpointKind::Overage => ProcessedResponse::Overage(process_overage_data(raw)),
        EndpointKind::Prepaid => ProcessedResponse::Prepaid(process_prepaid_data(raw)),
    }
}
