//! Declarative descriptors for pulling values out of loosely shaped remote JSON.

use serde_json::Value;

/// How consumers should interpret an extracted value. Extraction itself ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Percent,
    Time,
    Boolean,
    Cents,
    String,
    Raw,
}

/// Value substituted when a path is missing or null.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
}

impl FieldDefault {
    pub fn to_value(self) -> Value {
        match self {
            FieldDefault::Null => Value::Null,
            FieldDefault::Bool(b) => Value::Bool(b),
            FieldDefault::Int(n) => Value::from(n),
            FieldDefault::Float(f) => Value::from(f),
            FieldDefault::Str(s) => Value::from(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaField {
    /// Dot-delimited key path, e.g. "five_hour.utilization"
    pub path: &'static str,
    pub kind: FieldType,
    pub default: FieldDefault,
}

impl SchemaField {
    pub const fn new(path: &'static str, kind: FieldType, default: FieldDefault) -> Self {
        Self {
            path,
            kind,
            default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaGroup {
    Field(SchemaField),
    Fields(&'static [(&'static str, SchemaField)]),
}

/// Group name to group descriptor, in declaration order.
pub type Schema = [(&'static str, SchemaGroup)];

/// Substring routing rule for classifying intercepted responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub pattern: &'static str,
    pub contains: &'static str,
}
