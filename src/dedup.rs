use std::collections::HashSet;

use crate::models::UsageRecord;

/// Message id followed by request id, each empty when absent.
pub fn identity(record: &UsageRecord) -> String {
    let mut key = String::new();
    key.push_str(record.message_id.as_deref().unwrap_or(""));
    key.push_str(record.request_id.as_deref().unwrap_or(""));
    key
}

/// Seen-identity set shared across every file of one aggregation pass.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time an identity is offered.
    pub fn insert(&mut self, record: &UsageRecord) -> bool {
        self.seen.insert(identity(record))
    }

    pub fn into_seen(self) -> HashSet<String> {
        self.seen
    }
}

/// Keep the first occurrence of each identity, preserving input order.
pub fn dedupe(records: Vec<UsageRecord>) -> (Vec<UsageRecord>, HashSet<String>) {
    let mut dedup = Deduplicator::new();
    let kept = records.into_iter().filter(|r| dedup.insert(r)).collect();
    (kept, dedup.into_seen())
}
