use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::schema::EndpointKind;
use crate::utils::CONFIG_DIR_ENV;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKindArg {
    Usage,
    Overage,
    Prepaid,
}

impl From<ResponseKindArg> for EndpointKind {
    fn from(value: ResponseKindArg) -> Self {
        match value {
            ResponseKindArg::Usage => EndpointKind::Usage,
            ResponseKindArg::Overage => EndpointKind::Overage,
            ResponseKindArg::Prepaid => EndpointKind::Prepaid,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Token usage since local midnight
    Today,
    /// Token usage across all logs, optionally since an RFC 3339 timestamp
    Records {
        #[arg(long)]
        since: Option<String>,
        /// Include the deduplicated record list
        #[arg(long)]
        list: bool,
    },
    /// Context usage of the busiest recently active session
    Session {
        /// Restrict to the log directory of this workspace path
        #[arg(long)]
        workspace: Option<String>,
        /// Lookback window in minutes (default 60)
        #[arg(long)]
        session_minutes: Option<i64>,
    },
    /// Normalize a remote JSON response read from FILE or stdin
    Extract {
        #[arg(value_enum)]
        kind: ResponseKindArg,
        file: Option<PathBuf>,
    },
    /// Report which response kind a URL routes to
    Classify { url: String },
}

#[derive(clap::Parser, Debug)]
#[command(name = "claude-usage")]
pub struct Args {
    /// Force Claude data path(s), comma-separated. Defaults to ~/.config/claude and ~/.claude
    #[arg(long, env = CONFIG_DIR_ENV, global = true)]
    pub claude_config_dir: Option<String>,

    /// Emit JSON instead of colored text
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging to stderr
    #[arg(long, env = "CLAUDE_USAGE_DEBUG", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            claude_config_dir: self
                .claude_config_dir
                .clone()
                .filter(|v| !v.trim().is_empty()),
            debug: self.debug,
            ..EngineConfig::default()
        };
        if let Command::Session {
            session_minutes: Some(minutes),
            ..
        } = self.command
        {
            if minutes > 0 {
                config.session_duration = chrono::Duration::minutes(minutes);
            }
        }
        config
    }
}
