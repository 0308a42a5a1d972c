use anyhow::Result;
use serde::Serialize;

#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

// Provide a no-op color shim when "colors" feature is disabled
#[cfg(not(feature = "colors"))]
pub mod color_shim {
    use std::fmt::{self, Display, Formatter};

    #[derive(Clone)]
    pub struct Plain(pub String);

    impl Display for Plain {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    pub trait ColorizeShim {
        fn as_str(&self) -> &str;

        fn red(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn yellow(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn green(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn cyan(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn bold(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn dimmed(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
    }

    impl ColorizeShim for &str {
        fn as_str(&self) -> &str {
            self
        }
    }
    impl ColorizeShim for String {
        fn as_str(&self) -> &str {
            self.as_str()
        }
    }
    impl ColorizeShim for Plain {
        fn as_str(&self) -> &str {
            &self.0
        }
    }
}
#[cfg(not(feature = "colors"))]
use color_shim::ColorizeShim as OwoColorize;

use crate::models::{OverageSnapshot, PrepaidSnapshot, SessionUsageReport, UsageReport, UsageWindow};
use crate::usage_api::ProcessedResponse;
use crate::utils::format_tokens;

fn colorize_percent(pct: f64) -> String {
    if pct >= 95.0 {
        format!("{pct:.1}%").red().bold().to_string()
    } else if pct >= 80.0 {
        format!("{pct:.1}%").yellow().bold().to_string()
    } else {
        format!("{pct:.1}%").green().to_string()
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_usage_report(label: &str, report: &UsageReport) -> String {
    let mut out = format!(
        "{} {} tokens ({} msgs)\n  in {}  out {}  cache+ {}  cache> {}",
        label.cyan().bold(),
        format_tokens(report.total_tokens),
        report.message_count,
        format_tokens(report.input_tokens),
        format_tokens(report.output_tokens),
        format_tokens(report.cache_creation_tokens),
        format_tokens(report.cache_read_tokens),
    );
    for (model, tokens) in report.by_model() {
        out.push_str(&format!(
            "\n  {} {}",
            model.as_str().dimmed(),
            format_tokens(tokens.total())
        ));
    }
    out
}

pub fn format_session_report(report: &SessionUsageReport) -> String {
    if !report.is_active {
        return format!("{} {}", "session".cyan().bold(), "inactive".dimmed());
    }
    format!(
        "{} {} context tokens  cache+ {}  ({} active)",
        "session".cyan().bold(),
        format_tokens(report.total_tokens),
        format_tokens(report.cache_creation_tokens),
        report.active_session_count,
    )
}

fn format_window(name: &str, w: &UsageWindow) -> String {
    let reset = w
        .resets_at
        .map(|d| format!(" resets {}", d.format("%Y-%m-%d %H:%M UTC")))
        .unwrap_or_default();
    format!("{name} {}{reset}", colorize_percent(w.utilization))
}

fn format_overage(o: Option<&OverageSnapshot>) -> String {
    match o {
        None => format!("overage {}", "disabled".dimmed()),
        Some(o) => {
            let mut s = format!(
                "overage {:.2}/{:.2} {} {}",
                o.used,
                o.limit,
                o.currency,
                colorize_percent(o.percent as f64)
            );
            if o.out_of_credits {
                s.push_str(&format!(" {}", "out of credits".red().bold()));
            }
            s
        }
    }
}

fn format_prepaid(p: Option<&PrepaidSnapshot>) -> String {
    match p {
        None => format!("prepaid {}", "none".dimmed()),
        Some(p) => format!("prepaid {:.2} {}", p.balance, p.currency),
    }
}

pub fn format_processed(resp: &ProcessedResponse) -> String {
    match resp {
        ProcessedResponse::Usage(s) => [
            format_window("5h", &s.five_hour),
            format_window("7d", &s.seven_day),
            format_window("7d opus", &s.seven_day_opus),
            format_window("7d sonnet", &s.seven_day_sonnet),
        ]
        .join("\n"),
        ProcessedResponse::Overage(o) => format_overage(o.as_ref()),
        ProcessedResponse::Prepaid(p) => format_prepaid(p.as_ref()),
    }
}
