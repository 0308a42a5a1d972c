//! Schema-driven extraction from remote usage responses.
//!
//! Field layouts are plain data ([`SchemaField`] tables); adding a field or
//! endpoint means adding a table row, not touching [`extract`].

use serde_json::{Map, Value};

use crate::models::{EndpointDescriptor, FieldDefault, FieldType, Schema, SchemaField, SchemaGroup};

const fn field(path: &'static str, kind: FieldType, default: FieldDefault) -> SchemaField {
    SchemaField::new(path, kind, default)
}

const FIVE_HOUR: [(&str, SchemaField); 2] = [
    (
        "utilization",
        field("five_hour.utilization", FieldType::Percent, FieldDefault::Float(0.0)),
    ),
    (
        "resets_at",
        field("five_hour.resets_at", FieldType::Time, FieldDefault::Null),
    ),
];

const SEVEN_DAY: [(&str, SchemaField); 2] = [
    (
        "utilization",
        field("seven_day.utilization", FieldType::Percent, FieldDefault::Float(0.0)),
    ),
    (
        "resets_at",
        field("seven_day.resets_at", FieldType::Time, FieldDefault::Null),
    ),
];

const SEVEN_DAY_OPUS: [(&str, SchemaField); 2] = [
    (
        "utilization",
        field("seven_day_opus.utilization", FieldType::Percent, FieldDefault::Float(0.0)),
    ),
    (
        "resets_at",
        field("seven_day_opus.resets_at", FieldType::Time, FieldDefault::Null),
    ),
];

const SEVEN_DAY_SONNET: [(&str, SchemaField); 2] = [
    (
        "utilization",
        field("seven_day_sonnet.utilization", FieldType::Percent, FieldDefault::Float(0.0)),
    ),
    (
        "resets_at",
        field("seven_day_sonnet.resets_at", FieldType::Time, FieldDefault::Null),
    ),
];

/// Rolling-window utilization response.
pub static USAGE_SCHEMA: &Schema = &[
    ("five_hour", SchemaGroup::Fields(&FIVE_HOUR)),
    ("seven_day", SchemaGroup::Fields(&SEVEN_DAY)),
    ("seven_day_opus", SchemaGroup::Fields(&SEVEN_DAY_OPUS)),
    ("seven_day_sonnet", SchemaGroup::Fields(&SEVEN_DAY_SONNET)),
];

/// Overage (pay-as-you-go) spend limit response. Amounts are in cents.
pub static OVERAGE_SCHEMA: &Schema = &[
    (
        "enabled",
        SchemaGroup::Field(field("is_enabled", FieldType::Boolean, FieldDefault::Bool(false))),
    ),
    (
        "limit",
        SchemaGroup::Field(field("monthly_credit_limit", FieldType::Cents, FieldDefault::Int(0))),
    ),
    (
        "used",
        SchemaGroup::Field(field("used_credits", FieldType::Cents, FieldDefault::Int(0))),
    ),
    (
        "currency",
        SchemaGroup::Field(field("currency", FieldType::String, FieldDefault::Str("USD"))),
    ),
    (
        "out_of_credits",
        SchemaGroup::Field(field("out_of_credits", FieldType::Boolean, FieldDefault::Bool(false))),
    ),
];

/// Prepaid credit response; the balance is resolved separately from
/// [`PREPAID_BALANCE_FIELDS`].
pub static PREPAID_SCHEMA: &Schema = &[(
    "currency",
    SchemaGroup::Field(field("currency", FieldType::String, FieldDefault::Str("USD"))),
)];

/// Balance field names seen across deployments, in preference order.
pub static PREPAID_BALANCE_FIELDS: &[SchemaField] = &[
    field("balance", FieldType::Cents, FieldDefault::Null),
    field("remaining_credits", FieldType::Cents, FieldDefault::Null),
    field("credit_balance", FieldType::Cents, FieldDefault::Null),
    field("available_credits", FieldType::Cents, FieldDefault::Null),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Usage,
    Overage,
    Prepaid,
}

impl EndpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usage => "usage",
            Self::Overage => "overage",
            Self::Prepaid => "prepaid",
        }
    }
}

/// Routing table, checked in order. The generic usage route comes last.
pub static ENDPOINTS: &[(EndpointKind, EndpointDescriptor)] = &[
    (
        EndpointKind::Overage,
        EndpointDescriptor {
            pattern: "/api/organizations/",
            contains: "/overage_spend_limit",
        },
    ),
    (
        EndpointKind::Prepaid,
        EndpointDescriptor {
            pattern: "/api/organizations/",
            contains: "/prepaid/credits",
        },
    ),
    (
        EndpointKind::Usage,
        EndpointDescriptor {
            pattern: "/api/organizations/",
            contains: "/usage",
        },
    ),
];

/// Plain substring test; the URL is not parsed.
pub fn matches_endpoint(url: &str, endpoint: &EndpointDescriptor) -> bool {
    url.contains(endpoint.pattern) && url.contains(endpoint.contains)
}

pub fn classify_endpoint(url: &str) -> Option<EndpointKind> {
    ENDPOINTS
        .iter()
        .find(|(_, desc)| matches_endpoint(url, desc))
        .map(|(kind, _)| *kind)
}

/// Walk `field.path` through `raw`. Missing keys and nulls anywhere along the
/// path yield the declared default; zero, false and "" are real values.
pub fn resolve_field(raw: &Value, field: &SchemaField) -> Value {
    let mut cur = raw;
    for seg in field.path.split('.') {
        let next = match cur {
            Value::Object(map) => map.get(seg),
            Value::Array(items) => seg.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(v) if !v.is_null() => cur = v,
            _ => return field.default.to_value(),
        }
    }
    if cur.is_null() {
        field.default.to_value()
    } else {
        cur.clone()
    }
}

/// Resolve every group of `schema` against `raw`. Never fails.
pub fn extract(raw: &Value, schema: &Schema) -> Map<String, Value> {
    let mut out = Map::new();
    for (name, group) in schema {
        let value = match group {
            SchemaGroup::Field(f) => resolve_field(raw, f),
            SchemaGroup::Fields(fields) => {
                let mut nested = Map::new();
                for (field_name, f) in fields.iter() {
                    nested.insert((*field_name).to_string(), resolve_field(raw, f));
                }
                Value::Object(nested)
            }
        };
        out.insert((*name).to_string(), value);
    }
    out
}

/// First alternative that resolves to a non-null value.
pub fn resolve_first(raw: &Value, alternatives: &[SchemaField]) -> Option<Value> {
    alternatives
        .iter()
        .map(|f| resolve_field(raw, f))
        .find(|v| !v.is_null())
}
