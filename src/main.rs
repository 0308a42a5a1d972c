use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::process::ExitCode;

use claude_usage_engine::cli::{Args, Command};
use claude_usage_engine::display::{
    format_processed, format_session_report, format_usage_report, print_json,
};
use claude_usage_engine::schema::{EndpointKind, classify_endpoint};
use claude_usage_engine::usage::LogAggregator;
use claude_usage_engine::usage_api::process_response;
use claude_usage_engine::utils::{read_stdin, setup_tracing};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("claude-usage error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    setup_tracing(args.debug);
    let config = args.engine_config();
    let aggregator = LogAggregator::new(&config);

    match &args.command {
        Command::Today => {
            let report = aggregator.today_usage();
            if args.json {
                print_json(&report)?;
            } else {
                println!("{}", format_usage_report("today", &report));
            }
        }
        Command::Records { since, list } => {
            let since = since
                .as_deref()
                .map(|s| {
                    DateTime::parse_from_rfc3339(s)
                        .map(|d| d.with_timezone(&Utc))
                        .with_context(|| format!("parse --since {s}"))
                })
                .transpose()?;
            let mut report = aggregator.load_usage_records(since);
            if !list {
                report.records.clear();
            }
            if args.json {
                print_json(&report)?;
            } else {
                println!("{}", format_usage_report("usage", &report));
            }
        }
        Command::Session { workspace, .. } => {
            let report = aggregator.current_session_usage(workspace.as_deref());
            if args.json {
                print_json(&report)?;
            } else {
                println!("{}", format_session_report(&report));
            }
        }
        Command::Extract { kind, file } => {
            let bytes = match file {
                Some(path) => {
                    std::fs::read(path).with_context(|| format!("read {}", path.display()))?
                }
                None => read_stdin().context("read stdin")?,
            };
            let raw: Value = serde_json::from_slice(&bytes).context("parse response json")?;
            let processed = process_response(EndpointKind::from(*kind), &raw);
            if args.json {
                print_json(&processed)?;
            } else {
                println!("{}", format_processed(&processed));
            }
        }
        Command::Classify { url } => {
            let kind = classify_endpoint(url);
            if args.json {
                print_json(&serde_json::json!({ "kind": kind.map(|k| k.as_str()) }))?;
            } else {
                println!("{}", kind.map(|k| k.as_str()).unwrap_or("unknown"));
            }
        }
    }
    Ok(())
}
