use serde::Serialize;
use std::collections::BTreeMap;

use super::entry::{TokenCounts, UsageRecord};

/// Token totals over a deduplicated record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub total_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    pub message_count: u64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub records: Vec<UsageRecord>,
}

impl UsageReport {
    /// Sum the token components of already-deduplicated records.
    pub fn from_records(records: Vec<UsageRecord>) -> Self {
        let mut sum = TokenCounts::default();
        for r in &records {
            sum.accumulate(&r.tokens);
        }
        UsageReport {
            total_tokens: sum.total(),
            input_tokens: sum.input,
            output_tokens: sum.output,
            cache_creation_tokens: sum.cache_creation,
            cache_read_tokens: sum.cache_read,
            message_count: records.len() as u64,
            records,
        }
    }

    /// Per-model token totals, keyed by model name ("unknown" when absent)
    pub fn by_model(&self) -> BTreeMap<String, TokenCounts> {
        let mut out: BTreeMap<String, TokenCounts> = BTreeMap::new();
        for r in &self.records {
            let key = r.model.clone().unwrap_or_else(|| "unknown".to_string());
            out.entry(key).or_default().accumulate(&r.tokens);
        }
        out
    }
}

/// Context usage of the busiest recently active session.
///
/// `total_tokens` is the largest `cache_read` seen among the latest assistant
/// turns of recently modified session files, not a sum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUsageReport {
    pub total_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    pub message_count: u64,
    pub is_active: bool,
    pub active_session_count: u64,
}

impl SessionUsageReport {
    pub fn inactive() -> Self {
        Self::default()
    }
}
