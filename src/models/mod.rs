pub mod entry;
pub mod report;
pub mod schema;
pub mod snapshot;

pub use entry::{TokenCounts, UsageRecord};
pub use report::{SessionUsageReport, UsageReport};
pub use schema::{EndpointDescriptor, FieldDefault, FieldType, Schema, SchemaField, SchemaGroup};
pub use snapshot::{OverageSnapshot, PrepaidSnapshot, UsageSnapshot, UsageWindow};
