use chrono::Duration;
use std::env;

use crate::utils::CONFIG_DIR_ENV;

/// Default lookback for "current session" detection.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::hours(1);

/// Everything the engine needs from its caller. Nothing here is read from
/// global state once constructed.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Comma-separated Claude config directories tried before the OS defaults
    pub claude_config_dir: Option<String>,
    pub session_duration: Duration,
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            claude_config_dir: None,
            session_duration: DEFAULT_SESSION_DURATION,
            debug: false,
        }
    }
}

impl EngineConfig {
    /// Defaults plus the directory override from `CLAUDE_CONFIG_DIR`, if set.
    pub fn from_env() -> Self {
        Self {
            claude_config_dir: env::var(CONFIG_DIR_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty()),
            ..Self::default()
        }
    }
}
