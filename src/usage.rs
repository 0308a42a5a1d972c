//! # Usage Module
//!
//! Aggregates token usage from the session logs the Claude CLI appends under
//! `projects/`.
//!
//! ## Key Functions
//!
//! - `load_usage_records`: walks the whole log tree, validates, dedupes and sums records
//! - `today_usage`: the same, restricted to records since local midnight
//! - `current_session_usage`: context size of the busiest recently active session

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::config::EngineConfig;
use crate::dedup::Deduplicator;
use crate::models::{SessionUsageReport, UsageRecord, UsageReport};
use crate::records::{parse_usage_record, token_count};
use crate::utils::{
    candidate_roots, find_claude_data_directory, resolve_project_directory, start_of_local_day,
};

pub const LOG_EXTENSION: &str = "jsonl";
/// Prefix of logs written by sub-agent processes
pub const AGENT_FILE_PREFIX: &str = "agent-";

static SESSION_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\.jsonl$")
        .unwrap()
});

/// Primary session logs are named `<uuid>.jsonl`; sub-agent logs never count.
pub fn is_session_file_name(name: &str) -> bool {
    !name.starts_with(AGENT_FILE_PREFIX) && SESSION_FILE_RE.is_match(name)
}

/// Every `.jsonl` file below `dir`, in lexical walk order.
pub fn list_log_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "skipping unreadable log tree entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) == Some(LOG_EXTENSION) {
            files.push(entry.into_path());
        }
    }
    files
}

/// Whole file as text. Invalid UTF-8 (a multi-byte character cut off by a
/// concurrent append) is replaced so only the affected line fails to parse.
fn read_log(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Billable records of one file in line order. Malformed lines are logged and skipped.
pub fn parse_log_file(path: &Path) -> Result<Vec<UsageRecord>> {
    let contents = read_log(path)?;
    let mut records = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let t = line.trim();
        if t.is_empty() {
            continue;
        }
        let v: Value = match serde_json::from_str(t) {
            Ok(v) => v,
            Err(err) => {
                warn!(path = %path.display(), line = idx + 1, error = %err, "skipping malformed log line");
                continue;
            }
        };
        match parse_usage_record(&v) {
            Some(r) => records.push(r),
            None => trace!(path = %path.display(), line = idx + 1, "not a usage record"),
        }
    }
    Ok(records)
}

/// Cache token counts of the newest assistant turn that touched the cache,
/// scanning from the end of the file.
pub fn latest_cache_usage(path: &Path) -> Result<Option<(u64, u64)>> {
    let contents = read_log(path)?;
    let lines: Vec<&str> = contents.lines().collect();
    for line in lines.iter().rev() {
        let t = line.trim();
        if t.is_empty() {
            continue;
        }
        let Ok(v) = serde_json::from_str::<Value>(t) else {
            debug!(path = %path.display(), "skipping torn or malformed line");
            continue;
        };
        if v.get("type").and_then(Value::as_str) != Some("assistant") {
            continue;
        }
        let Some(usage) = v.get("message").and_then(|m| m.get("usage")) else {
            continue;
        };
        let cache_creation = token_count(usage, "cache_creation_input_tokens");
        let cache_read = token_count(usage, "cache_read_input_tokens");
        if cache_creation.saturating_add(cache_read) > 0 {
            return Ok(Some((cache_creation, cache_read)));
        }
    }
    Ok(None)
}

fn modified_at(path: &Path) -> Result<DateTime<Utc>> {
    let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    let modified = meta
        .modified()
        .with_context(|| format!("mtime {}", path.display()))?;
    Ok(modified.into())
}

pub struct LogAggregator {
    roots: Vec<PathBuf>,
    session_duration: Duration,
}

impl LogAggregator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            roots: candidate_roots(config.claude_config_dir.as_deref()),
            session_duration: config.session_duration,
        }
    }

    /// Aggregator over an explicit, ordered list of candidate `projects` roots.
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            session_duration: EngineConfig::default().session_duration,
        }
    }

    pub fn with_session_duration(mut self, duration: Duration) -> Self {
        self.session_duration = duration;
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Sum all billable records under the global data root, deduplicated
    /// across files. With `since`, records without a parseable timestamp or
    /// older than `since` are dropped before deduplication.
    pub fn load_usage_records(&self, since: Option<DateTime<Utc>>) -> UsageReport {
        let Some(root) = find_claude_data_directory(&self.roots) else {
            return UsageReport::default();
        };

        let mut dedup = Deduplicator::new();
        let mut kept = Vec::new();
        for path in list_log_files(&root) {
            let records = match parse_log_file(&path) {
                Ok(r) => r,
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "skipping unreadable log file");
                    continue;
                }
            };
            for record in records {
                if let Some(since) = since {
                    if !record.ts.is_some_and(|ts| ts >= since) {
                        continue;
                    }
                }
                if dedup.insert(&record) {
                    kept.push(record);
                }
            }
        }
        debug!(root = %root.display(), records = kept.len(), "aggregated usage records");
        UsageReport::from_records(kept)
    }

    pub fn today_usage(&self) -> UsageReport {
        self.today_usage_at(Local::now())
    }

    pub fn today_usage_at(&self, now: DateTime<Local>) -> UsageReport {
        self.load_usage_records(Some(start_of_local_day(now)))
    }

    pub fn current_session_usage(&self, workspace_path: Option<&str>) -> SessionUsageReport {
        self.current_session_usage_at(workspace_path, Utc::now())
    }

    /// Report for the recently modified session closest to its context limit.
    ///
    /// A workspace path scopes the scan to that project's directory; if the
    /// directory does not exist the report is inactive. The global tree is
    /// never used as a fallback for a scoped call.
    pub fn current_session_usage_at(
        &self,
        workspace_path: Option<&str>,
        now: DateTime<Utc>,
    ) -> SessionUsageReport {
        let dir = match workspace_path {
            Some(ws) => self
                .roots
                .iter()
                .find_map(|root| resolve_project_directory(root, ws)),
            None => find_claude_data_directory(&self.roots),
        };
        let Some(dir) = dir else {
            debug!(workspace = ?workspace_path, "no log directory for session scan");
            return SessionUsageReport::inactive();
        };

        let window_start = now - self.session_duration;
        let mut candidates: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
        for path in list_log_files(&dir) {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !is_session_file_name(name) {
                continue;
            }
            match modified_at(&path) {
                Ok(mtime) if mtime >= window_start => candidates.push((path, mtime)),
                Ok(_) => {}
                Err(err) => warn!(error = %format!("{err:#}"), "skipping session file"),
            }
        }
        candidates.sort_by(|a, b| b.1.cmp(&a.1));

        let mut report = SessionUsageReport::inactive();
        for (path, _) in &candidates {
            let (cache_creation, cache_read) = match latest_cache_usage(path) {
                Ok(Some(found)) => found,
                Ok(None) => continue,
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "skipping session file");
                    continue;
                }
            };
            report.active_session_count += 1;
            if cache_read > report.cache_read_tokens {
                report.cache_read_tokens = cache_read;
                report.cache_creation_tokens = cache_creation;
            }
        }
        report.total_tokens = report.cache_read_tokens;
        report.message_count = report.active_session_count;
        report.is_active = report.cache_read_tokens > 0;
        report
    }
}
