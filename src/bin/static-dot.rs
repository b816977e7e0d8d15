//! static-dot - run Graphviz `dot` from the private cache
//!
//! Usage:
//!   static-dot [dot arguments...]
//!
//! Installs `dot` on first use, then runs it with the given arguments and
//! exits with its exit code.

use anyhow::{Context, Result};
use static_graphviz::core::output;
use static_graphviz::{Config, Resolver};
use std::process::ExitStatus;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output::error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let resolution = Resolver::new(Config::from_env())
        .resolve()
        .context("cannot resolve graphviz dot")?;

    let status = resolution
        .command()?
        .args(std::env::args_os().skip(1))
        .status()
        .with_context(|| format!("cannot run {}", resolution.executable.display()))?;

    Ok(exit_code(status))
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
