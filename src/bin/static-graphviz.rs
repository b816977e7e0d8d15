//! static-graphviz - manage the cached Graphviz install
//!
//! Usage:
//!   static-graphviz paths               Print DOT=<path>, installing if needed
//!   static-graphviz install             Install (no-op when cached)
//!   static-graphviz env [--weak]        Print PATH/LD_LIBRARY_PATH updates
//!   static-graphviz status              Show install state without downloading
//!
//! Reports go to stdout as `KEY=value` lines; progress and diagnostics go to
//! stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use static_graphviz::core::config::{HOME_ENV, URL_ENV};
use static_graphviz::core::output;
use static_graphviz::install::marker;
use static_graphviz::{Config, PathInjector, Resolver};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "static-graphviz")]
#[command(about = "Fetch and cache a prebuilt Graphviz dot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base directory for the cache and lock file
    #[arg(long, global = true, env = HOME_ENV)]
    home: Option<PathBuf>,

    /// Install into this directory instead of <home>/bin/<platform>
    #[arg(short, long, global = true)]
    download_dir: Option<PathBuf>,

    /// Download the archive from this URL instead of the registered one
    #[arg(long, global = true, env = URL_ENV)]
    url: Option<String>,

    /// Do not chmod the executable or run its self-check
    #[arg(long, global = true)]
    no_fix_permissions: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved executable as DOT=<path>
    Paths,

    /// Install graphviz into the cache
    Install,

    /// Print the environment updates that expose dot
    Env {
        /// Keep a dot already on PATH instead of installing
        #[arg(long)]
        weak: bool,
    },

    /// Show platform, install directory and marker without downloading
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let resolver = Resolver::new(config_from(&cli));

    match cli.command {
        Commands::Paths => {
            let resolution = resolver.resolve().context("cannot resolve graphviz dot")?;
            println!("DOT={}", resolution.executable.display());
        }

        Commands::Install => {
            let resolution = resolver.resolve().context("cannot install graphviz")?;
            output::success(&format!("dot is at {}", resolution.executable.display()));
        }

        Commands::Env { weak } => {
            let update = PathInjector::new(resolver)
                .add_to_path(weak)
                .context("cannot resolve graphviz dot")?;
            if !update.modified {
                output::info(&format!(
                    "using {}, environment unchanged",
                    update.executable.display()
                ));
            }
            for (var, value) in update.env.to_assignments()? {
                println!("{}={}", var, value.to_string_lossy());
            }
        }

        Commands::Status => show_status(&resolver)?,
    }

    Ok(())
}

/// Environment defaults, overridden by the command line
fn config_from(cli: &Cli) -> Config {
    let mut config = Config::from_env();
    if let Some(home) = &cli.home {
        config.base_dir = home.clone();
    }
    if let Some(dir) = &cli.download_dir {
        config = config.download_dir(dir);
    }
    if let Some(url) = &cli.url {
        config = config.url_override(url);
    }
    if cli.no_fix_permissions {
        config = config.fix_permissions(false);
    }
    config
}

fn show_status(resolver: &Resolver) -> Result<()> {
    println!("PLATFORM={}", resolver.platform());

    let install_dir = match resolver.install_dir() {
        Ok(dir) => dir,
        Err(e) => {
            output::warning(&e.to_string());
            println!("SUPPORTED=false");
            return Ok(());
        }
    };

    println!("SUPPORTED=true");
    println!("URL={}", resolver.download_url()?);
    println!("INSTALL_DIR={}", install_dir.display());
    println!("LOCK_FILE={}", resolver.config().lock_path().display());
    println!("INSTALLED={}", resolver.is_installed()?);

    if marker::is_installed(&install_dir) {
        match marker::read_marker(&install_dir) {
            Ok(m) => {
                println!("MARKER_SCHEMA={}", m.schema);
                println!("INSTALLED_FROM={}", m.source_url);
                println!("INSTALLED_AT={}", m.installed_at.to_rfc3339());
            }
            Err(e) => output::warning(&e.to_string()),
        }
    }

    Ok(())
}
