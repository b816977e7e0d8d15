//! Colored status output
//!
//! Uses owo-colors for terminal colors. Everything goes to stderr: stdout is
//! reserved for the wrapped `dot` process and for `KEY=value` reports.

use owo_colors::OwoColorize;
use std::sync::OnceLock;

/// Environment variable that silences detail lines
pub const QUIET_ENV: &str = "STATIC_GRAPHVIZ_QUIET";

fn quiet() -> bool {
    static QUIET: OnceLock<bool> = OnceLock::new();
    *QUIET.get_or_init(|| {
        std::env::var(QUIET_ENV)
            .map(|v| !v.is_empty() && v != "0")
            .unwrap_or(false)
    })
}

/// Print an action header (blue, bold)
/// Example: "==> Installing graphviz for linux"
pub fn action(message: &str) {
    eprintln!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a detail line (dimmed prefix)
/// Example: "     extracting graphviz.deb"
pub fn detail(message: &str) {
    if quiet() {
        return;
    }
    eprintln!("     {}", message.dimmed());
}

/// Print a success message (green)
pub fn success(message: &str) {
    eprintln!("{} {}", "==>".green().bold(), message.green());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    eprintln!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}
