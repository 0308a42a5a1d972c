use chrono::{DateTime, Local, TimeZone, Utc};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding comma-separated Claude config directories
pub const CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

const PROJECTS_DIR: &str = "projects";

/// Candidate log roots in lookup order: override entries first, then the
/// XDG config location, then `~/.claude`. Existence is not checked here.
pub fn candidate_roots(override_env: Option<&str>) -> Vec<PathBuf> {
    let mut roots = vec![];
    if let Some(list) = override_env {
        for p in list.split(',') {
            let p = p.trim();
            if p.is_empty() {
                continue;
            }
            roots.push(PathBuf::from(p).join(PROJECTS_DIR));
        }
    }
    let basedirs = directories::BaseDirs::new();
    let home = basedirs
        .as_ref()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~"));
    let xdg_config = basedirs
        .as_ref()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| home.join(".config"));
    roots.push(xdg_config.join("claude").join(PROJECTS_DIR));
    roots.push(home.join(".claude").join(PROJECTS_DIR));
    roots
}

/// First candidate that exists and is a directory. Partial trees are never merged.
pub fn find_claude_data_directory(candidates: &[PathBuf]) -> Option<PathBuf> {
    let found = candidates.iter().find(|p| p.is_dir()).cloned();
    match &found {
        Some(p) => debug!(root = %p.display(), "resolved claude data directory"),
        None => debug!(candidates = candidates.len(), "no claude data directory found"),
    }
    found
}

/// Flatten a workspace path into the directory name the logging tool uses
/// under `projects/`: every path separator becomes a dash.
pub fn project_directory_name(workspace_path: Option<&str>) -> Option<String> {
    let ws = workspace_path?;
    if ws.is_empty() {
        return None;
    }
    Some(
        ws.chars()
            .map(|c| if c == '/' || c == '\\' { '-' } else { c })
            .collect(),
    )
}

/// `root/<flattened workspace>` if that is an existing directory.
pub fn resolve_project_directory(root: &Path, workspace_path: &str) -> Option<PathBuf> {
    let name = project_directory_name(Some(workspace_path))?;
    let dir = root.join(name);
    if dir.is_dir() { Some(dir) } else { None }
}

/// Local midnight of the day containing `now`, as UTC.
pub fn start_of_local_day(now: DateTime<Local>) -> DateTime<Utc> {
    let Some(midnight) = now.date_naive().and_hms_opt(0, 0, 0) else {
        return now.with_timezone(&Utc);
    };
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|| now.with_timezone(&Utc))
}

pub fn setup_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

pub fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn format_tokens(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.1}B", n as f64 / 1e9)
    } else if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1e3)
    } else {
        n.to_string()
    }
}
