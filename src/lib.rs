//! # Claude Usage Engine
//!
//! Estimates how much of a plan's usage capacity has been consumed, from two
//! unreliable sources:
//!
//! - remote usage/overage/prepaid responses with a drifting JSON shape, read
//!   through declarative field tables
//! - the append-only session logs the Claude CLI writes under `projects/`,
//!   scanned, validated, deduplicated and summed into daily and
//!   current-session token counts
//!
//! ## Features
//!
//! - `colors` (default): Enables terminal color output via owo-colors

/// Command-line argument parsing
pub mod cli;

/// Engine configuration supplied by the caller
pub mod config;

/// Record identity and duplicate suppression
pub mod dedup;

/// Text and JSON output for the CLI
pub mod display;

/// Data models for log records, reports, schemas and snapshots
pub mod models;

/// Session-log line validation
pub mod records;

/// Declarative extraction from remote JSON
pub mod schema;

/// Log tree aggregation
pub mod usage;

/// Remote response normalization
pub mod usage_api;

/// Path resolution and small helpers
pub mod utils;
