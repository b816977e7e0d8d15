//! Runtime configuration
//!
//! Everything has a default; environment variables override the defaults and
//! the builder-style setters override both.
//!
//! | Variable                       | Meaning                              |
//! |--------------------------------|--------------------------------------|
//! | `STATIC_GRAPHVIZ_HOME`         | base directory for bins and lock     |
//! | `STATIC_GRAPHVIZ_TIMEOUT`      | download read timeout, seconds       |
//! | `STATIC_GRAPHVIZ_LOCK_TIMEOUT` | install lock wait, seconds           |
//! | `STATIC_GRAPHVIZ_URL`          | replacement archive URL (mirrors)    |

use std::path::PathBuf;
use std::time::Duration;

pub const HOME_ENV: &str = "STATIC_GRAPHVIZ_HOME";
pub const TIMEOUT_ENV: &str = "STATIC_GRAPHVIZ_TIMEOUT";
pub const LOCK_TIMEOUT_ENV: &str = "STATIC_GRAPHVIZ_LOCK_TIMEOUT";
pub const URL_ENV: &str = "STATIC_GRAPHVIZ_URL";

/// Default download timeout (10 minutes)
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 600;

/// Default lock wait (10 minutes), after which the install proceeds unlocked
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 600;

const MAX_TIMEOUT_SECS: u64 = 3600;

/// Settings shared by the resolver and the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root holding `bin/<platform>/` and `lock.file`
    pub base_dir: PathBuf,
    /// Explicit install directory, bypassing `<base>/bin/<platform>`
    pub download_dir: Option<PathBuf>,
    /// Read timeout for the archive download
    pub download_timeout: Duration,
    /// How long to wait for the install lock before going ahead without it
    pub lock_timeout: Duration,
    /// Replacement for the platform's registered archive URL
    pub url_override: Option<String>,
    /// chmod the executable and run the self-check (non-Windows only)
    pub fix_permissions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            download_dir: None,
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            lock_timeout: Duration::from_secs(DEFAULT_LOCK_TIMEOUT_SECS),
            url_override: None,
            fix_permissions: true,
        }
    }
}

impl Config {
    /// Defaults overridden by `STATIC_GRAPHVIZ_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            config.base_dir = PathBuf::from(home);
        }
        if let Some(secs) = env_secs(TIMEOUT_ENV) {
            config.download_timeout = Duration::from_secs(secs.clamp(5, MAX_TIMEOUT_SECS));
        }
        if let Some(secs) = env_secs(LOCK_TIMEOUT_ENV) {
            config.lock_timeout = Duration::from_secs(secs.min(MAX_TIMEOUT_SECS));
        }
        config.url_override = std::env::var(URL_ENV).ok().filter(|v| !v.is_empty());

        config
    }

    /// Config rooted at `base_dir`, otherwise default.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn url_override(mut self, url: impl Into<String>) -> Self {
        self.url_override = Some(url.into());
        self
    }

    pub fn fix_permissions(mut self, fix: bool) -> Self {
        self.fix_permissions = fix;
        self
    }

    /// `<base>/lock.file`
    pub fn lock_path(&self) -> PathBuf {
        self.base_dir.join("lock.file")
    }

    /// `<base>/bin`
    pub fn bin_dir(&self) -> PathBuf {
        self.base_dir.join("bin")
    }
}

fn env_secs(var: &str) -> Option<u64> {
    std::env::var(var).ok().and_then(|s| s.trim().parse::<u64>().ok())
}

/// Per-user cache directory, or the temp dir when there is none
fn default_base_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("static-graphviz")
}
