use chrono::{Duration, Local, Utc};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use claude_usage_engine::usage::LogAggregator;

fn usage_line(msg: &str, req: &str, ts: &str, tokens: [u64; 4]) -> String {
    json!({
        "timestamp": ts,
        "requestId": req,
        "type": "assistant",
        "message": {
            "id": msg,
            "model": "claude-sonnet-4-20250514",
            "usage": {
                "input_tokens": tokens[0],
                "output_tokens": tokens[1],
                "cache_creation_input_tokens": tokens[2],
                "cache_read_input_tokens": tokens[3]
            }
        }
    })
    .to_string()
}

fn write_log(root: &Path, rel: &str, lines: &[String]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn projects(tmp: &TempDir) -> PathBuf {
    let p = tmp.path().join("projects");
    fs::create_dir_all(&p).unwrap();
    p
}

const TS: &str = "2025-06-01T10:00:00.000Z";

#[test]
fn duplicates_across_files_count_once() {
    let tmp = TempDir::new().unwrap();
    let root = projects(&tmp);
    let shared = [
        usage_line("msg_a", "req_a", TS, [100, 10, 0, 0]),
        usage_line("msg_b", "req_b", TS, [200, 20, 0, 0]),
    ];
    write_log(&root, "-proj-one/s1.jsonl", &shared);
    write_log(&root, "-proj-two/s2.jsonl", &shared);

    let report = LogAggregator::with_roots(vec![root]).load_usage_records(None);
    assert_eq!(report.message_count, 2);
    assert_eq!(report.input_tokens, 300);
    assert_eq!(report.output_tokens, 30);
    assert_eq!(report.total_tokens, 330);
    assert_eq!(report.records.len(), 2);
}

#[test]
fn shared_record_plus_unique_records() {
    let tmp = TempDir::new().unwrap();
    let root = projects(&tmp);
    let dup = usage_line("msg_dup", "req_dup", TS, [1, 1, 1, 1]);
    write_log(
        &root,
        "-p/a.jsonl",
        &[dup.clone(), usage_line("msg_x", "req_x", TS, [10, 0, 0, 0])],
    );
    write_log(
        &root,
        "-p/b.jsonl",
        &[dup, usage_line("msg_y", "req_y", TS, [0, 20, 0, 0])],
    );

    let report = LogAggregator::with_roots(vec![root]).load_usage_records(None);
    assert_eq!(report.message_count, 3);
    assert_eq!(report.total_tokens, 4 + 10 + 20);
}

#[test]
fn total_is_sum_of_components() {
    let tmp = TempDir::new().unwrap();
    let root = projects(&tmp);
    write_log(
        &root,
        "-p/a.jsonl",
        &[
            usage_line("m1", "r1", TS, [5, 6, 7, 8]),
            usage_line("m2", "r2", TS, [1, 2, 3, 4]),
        ],
    );
    let r = LogAggregator::with_roots(vec![root]).load_usage_records(None);
    assert_eq!(
        r.total_tokens,
        r.input_tokens + r.output_tokens + r.cache_creation_tokens + r.cache_read_tokens
    );
    assert_eq!(r.total_tokens, 36);
}

#[test]
fn duplicate_discovery_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let root = projects(&tmp);
    let lines = [
        usage_line("m1", "r1", TS, [5, 6, 7, 8]),
        usage_line("m2", "r2", TS, [1, 2, 3, 4]),
    ];
    write_log(&root, "-p/a.jsonl", &lines);
    let once = LogAggregator::with_roots(vec![root.clone()]).load_usage_records(None);

    write_log(&root, "-p/copy/a.jsonl", &lines);
    let twice = LogAggregator::with_roots(vec![root]).load_usage_records(None);
    assert_eq!(once, twice);
}

#[test]
fn malformed_and_invalid_lines_are_skipped() {
    let tmp = TempDir::new().unwrap();
    let root = projects(&tmp);
    let lines = [
        "{not json".to_string(),
        String::new(),
        json!({"type": "user", "message": {"content": "hi"}}).to_string(),
        json!({"message": {"model": "<synthetic>", "usage": {"input_tokens": 9, "output_tokens": 9}}})
            .to_string(),
        json!({"isApiErrorMessage": true, "message": {"usage": {"input_tokens": 9, "output_tokens": 9}}})
            .to_string(),
        usage_line("m1", "r1", TS, [1, 2, 0, 0]),
        // torn trailing write
        "{\"timestamp\":\"2025-06-01".to_string(),
    ];
    write_log(&root, "-p/a.jsonl", &lines);
    fs::write(root.join("-p/notes.txt"), "ignored").unwrap();

    let r = LogAggregator::with_roots(vec![root]).load_usage_records(None);
    assert_eq!(r.message_count, 1);
    assert_eq!(r.total_tokens, 3);
}

#[test]
fn truncated_multibyte_tail_keeps_valid_records() {
    let tmp = TempDir::new().unwrap();
    let root = projects(&tmp);
    let path = root.join("-p").join("0f8fad5b-d9cb-469f-a165-70867728950e.jsonl");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut bytes = usage_line("m1", "r1", TS, [0, 0, 0, 700]).into_bytes();
    bytes.extend_from_slice(b"\n{\"type\":\"user\",\"message\":{\"content\":\"caf\xC3");
    fs::write(&path, bytes).unwrap();

    let r = LogAggregator::with_roots(vec![root]).load_usage_records(None);
    assert_eq!(r.message_count, 1);
    assert_eq!(r.total_tokens, 700);
}

#[test]
fn since_filter_applies_before_dedup() {
    let tmp = TempDir::new().unwrap();
    let root = projects(&tmp);
    write_log(
        &root,
        "-p/a.jsonl",
        &[
            usage_line("m", "r", "2025-05-01T00:00:00Z", [100, 0, 0, 0]),
            usage_line("m", "r", "2025-06-02T00:00:00Z", [7, 0, 0, 0]),
            usage_line("no-ts", "r", "garbage", [50, 0, 0, 0]),
        ],
    );
    let since = "2025-06-01T00:00:00Z".parse().unwrap();
    let r = LogAggregator::with_roots(vec![root.clone()]).load_usage_records(Some(since));
    assert_eq!(r.message_count, 1);
    assert_eq!(r.input_tokens, 7);

    let all = LogAggregator::with_roots(vec![root]).load_usage_records(None);
    assert_eq!(all.message_count, 2);
    assert_eq!(all.input_tokens, 150);
}

#[test]
fn missing_root_yields_zero_report() {
    let tmp = TempDir::new().unwrap();
    let r = LogAggregator::with_roots(vec![tmp.path().join("absent")]).load_usage_records(None);
    assert_eq!(r.total_tokens, 0);
    assert_eq!(r.message_count, 0);
    assert!(r.records.is_empty());
}

#[test]
fn only_first_existing_root_is_read() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let r1 = projects(&first);
    let r2 = projects(&second);
    write_log(&r1, "-p/a.jsonl", &[usage_line("m1", "r1", TS, [1, 0, 0, 0])]);
    write_log(&r2, "-p/b.jsonl", &[usage_line("m2", "r2", TS, [1000, 0, 0, 0])]);

    let r = LogAggregator::with_roots(vec![r1, r2]).load_usage_records(None);
    assert_eq!(r.input_tokens, 1);
}

#[test]
fn today_usage_starts_at_local_midnight() {
    let tmp = TempDir::new().unwrap();
    let root = projects(&tmp);
    let now = Utc::now();
    let earlier = now - Duration::days(3);
    write_log(
        &root,
        "-p/a.jsonl",
        &[
            usage_line("m-old", "r", &earlier.to_rfc3339(), [100, 0, 0, 0]),
            usage_line("m-now", "r", &now.to_rfc3339(), [5, 5, 0, 0]),
        ],
    );
    let r = LogAggregator::with_roots(vec![root]).today_usage_at(Local::now());
    assert_eq!(r.message_count, 1);
    assert_eq!(r.total_tokens, 10);
}

#[test]
fn by_model_breakdown() {
    let tmp = TempDir::new().unwrap();
    let root = projects(&tmp);
    let opus = json!({
        "requestId": "r9",
        "message": {"id": "m9", "model": "claude-opus-4", "usage": {"input_tokens": 4, "output_tokens": 1}}
    })
    .to_string();
    write_log(&root, "-p/a.jsonl", &[usage_line("m1", "r1", TS, [1, 1, 0, 0]), opus]);
    let r = LogAggregator::with_roots(vec![root]).load_usage_records(None);
    let by_model = r.by_model();
    assert_eq!(by_model["claude-opus-4"].total(), 5);
    assert_eq!(by_model["claude-sonnet-4-20250514"].total(), 2);
}

#[test]
fn report_serializes_camel_case() {
    let tmp = TempDir::new().unwrap();
    let root = projects(&tmp);
    write_log(&root, "-p/a.jsonl", &[usage_line("m1", "r1", TS, [1, 1, 0, 0])]);
    let mut r = LogAggregator::with_roots(vec![root]).load_usage_records(None);
    let v = serde_json::to_value(&r).unwrap();
    assert_eq!(v["totalTokens"], json!(2));
    assert_eq!(v["messageCount"], json!(1));
    assert_eq!(v["records"][0]["messageId"], json!("m1"));

    r.records.clear();
    let v = serde_json::to_value(&r).unwrap();
    assert!(v.get("records").is_none());
}
