//! Executable resolution
//!
//! [`Resolver::resolve`] is the one operation everything else builds on:
//!
//! 1. Work out the install directory for the platform (or the override).
//! 2. Take the install lock. If it cannot be had in time, warn and go on
//!    without it; a duplicated install is preferred over blocking forever.
//! 3. Install unless a current marker is present.
//! 4. Search the install tree for `dot`, on every call.
//! 5. Outside Windows: make it readable and executable for everyone, check
//!    access, and run a quick self-check whose failure is only a warning.
//! 6. On Linux, put the executable's directory in front of the library path
//!    in the returned [`EnvDelta`].

use crate::core::config::Config;
use crate::core::lock::InstallLock;
use crate::core::output;
use crate::core::platform::Platform;
use crate::error::{Error, IoResultExt, Result};
use crate::install::{archive, discover, marker};
use crate::internal::fs_utils;
use crate::paths::{EnvDelta, LIBRARY_PATH_VAR};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Read and execute for owner, group and other
const EXEC_READ_BITS: u32 = 0o555;

/// A resolved executable and the environment it should run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub executable: PathBuf,
    pub env: EnvDelta,
}

impl Resolution {
    /// A `Command` for the executable with the environment delta applied.
    pub fn command(&self) -> Result<Command> {
        let mut cmd = Command::new(&self.executable);
        self.env.apply_to_command(&mut cmd)?;
        Ok(cmd)
    }
}

#[derive(Debug, Clone)]
pub struct Resolver {
    config: Config,
    platform: Platform,
}

impl Resolver {
    /// Resolver for the running platform.
    pub fn new(config: Config) -> Self {
        Self::for_platform(config, Platform::current())
    }

    pub fn for_platform(config: Config, platform: Platform) -> Self {
        Self { config, platform }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Archive URL for this platform, honoring the configured override.
    pub fn download_url(&self) -> Result<String> {
        let registered = self.platform.download_url()?;
        Ok(self
            .config
            .url_override
            .clone()
            .unwrap_or_else(|| registered.to_string()))
    }

    /// Absolute install directory: the override, or `<base>/bin/<platform>`.
    pub fn install_dir(&self) -> Result<PathBuf> {
        self.platform.check_supported()?;
        let dir = match &self.config.download_dir {
            Some(dir) => dir.clone(),
            None => self.config.bin_dir().join(self.platform.key()),
        };
        std::path::absolute(&dir)
            .io_context(|| format!("cannot make {} absolute", dir.display()))
    }

    /// Marker check only. Never downloads.
    pub fn is_installed(&self) -> Result<bool> {
        Ok(marker::is_current(&self.install_dir()?))
    }

    /// Install if needed and return the executable with its environment.
    pub fn resolve(&self) -> Result<Resolution> {
        let install_dir = self.install_dir()?;
        let url = self.download_url()?;

        let _lock = self.lock()?;

        if !marker::is_current(&install_dir) {
            if marker::is_stale(&install_dir) {
                output::detail("install marker is from another version, reinstalling");
            }
            self.install(&install_dir, &url)
                .map_err(|source| Error::InstallFailed {
                    url: url.clone(),
                    source: Box::new(source),
                })?;
        }

        let executable =
            discover::find_executable(archive::search_root(&install_dir), &self.platform)?;
        let env = self.env_for(&executable);

        if !self.platform.is_windows() && self.config.fix_permissions {
            make_runnable(&executable)?;
            self_check(&executable, &env);
        }

        Ok(Resolution { executable, env })
    }

    /// Best-effort lock: `None` when the wait timed out.
    fn lock(&self) -> Result<Option<InstallLock>> {
        let lock_path = self.config.lock_path();
        match InstallLock::acquire(&lock_path, self.config.lock_timeout) {
            Ok(lock) => Ok(Some(lock)),
            Err(err @ Error::LockTimeout { .. }) => {
                output::warning(&format!("{}; installing without it", err));
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn install(&self, install_dir: &Path, url: &str) -> Result<()> {
        output::action(&format!("Installing graphviz for {}", self.platform));
        let executable = archive::install_from_archive(
            &self.platform,
            url,
            install_dir,
            self.config.download_timeout,
        )?;
        marker::mark_installed(install_dir, self.platform.key(), url)?;
        output::success(&format!("Installed {}", executable.display()));
        Ok(())
    }

    fn env_for(&self, executable: &Path) -> EnvDelta {
        let mut env = EnvDelta::new();
        if self.platform.is_linux()
            && let Some(dir) = executable.parent()
        {
            env.prepend(LIBRARY_PATH_VAR, dir);
        }
        env
    }
}

fn make_runnable(executable: &Path) -> Result<()> {
    fs_utils::add_mode_bits(executable, EXEC_READ_BITS)?;
    if !fs_utils::is_readable_executable(executable) {
        return Err(Error::NotExecutable(executable.to_path_buf()));
    }
    Ok(())
}

/// Run `dot -c` (plugin registration). Failure is reported, never raised.
fn self_check(executable: &Path, env: &EnvDelta) {
    let mut cmd = Command::new(executable);
    cmd.arg("-c")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if let Err(e) = env.apply_to_command(&mut cmd) {
        output::warning(&format!("self-check skipped: {}", e));
        return;
    }

    match cmd.status() {
        Ok(status) if status.success() => {}
        Ok(status) => output::warning(&format!(
            "{} -c exited with {}",
            executable.display(),
            status
        )),
        Err(e) => output::warning(&format!("{} -c could not run: {}", executable.display(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_install_dir_is_namespaced_by_platform() {
        let temp = TempDir::new().unwrap();
        let resolver =
            Resolver::for_platform(Config::with_base_dir(temp.path()), Platform::Linux);

        assert_eq!(resolver.install_dir().unwrap(), temp.path().join("bin/linux"));
    }

    #[test]
    fn test_install_dir_override_is_absolute() {
        let config = Config::with_base_dir("/unused").download_dir("relative/graphviz");
        let resolver = Resolver::for_platform(config, Platform::Windows);

        let dir = resolver.install_dir().unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("relative/graphviz"));
    }

    #[test]
    fn test_unsupported_platform_fails_before_touching_disk() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("home");
        let resolver = Resolver::for_platform(Config::with_base_dir(&base), Platform::MacOs);

        let err = resolver.resolve().unwrap_err();
        assert!(matches!(&err, Error::UnsupportedPlatform(key) if key == "darwin"));
        assert!(!base.exists());
    }

    #[test]
    fn test_url_override_applies_to_registered_platforms_only() {
        let config = Config::with_base_dir("/tmp/x").url_override("http://mirror/dot.deb");

        let linux = Resolver::for_platform(config.clone(), Platform::Linux);
        assert_eq!(linux.download_url().unwrap(), "http://mirror/dot.deb");

        let other = Resolver::for_platform(config, Platform::from_os("haiku"));
        assert!(other.download_url().is_err());
    }

    #[test]
    fn test_library_path_only_on_linux() {
        let exe = Path::new("/cache/bin/linux/usr/bin/dot");

        let linux = Resolver::for_platform(Config::default(), Platform::Linux);
        assert_eq!(
            linux.env_for(exe).get(LIBRARY_PATH_VAR),
            &[PathBuf::from("/cache/bin/linux/usr/bin")]
        );

        let windows = Resolver::for_platform(Config::default(), Platform::Windows);
        assert!(windows.env_for(exe).is_empty());
    }

    #[test]
    fn test_is_installed_reads_marker_only() {
        let temp = TempDir::new().unwrap();
        let resolver =
            Resolver::for_platform(Config::with_base_dir(temp.path()), Platform::Linux);
        assert!(!resolver.is_installed().unwrap());

        marker::mark_installed(&resolver.install_dir().unwrap(), "linux", "http://x").unwrap();
        assert!(resolver.is_installed().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_cached_install_resolves_without_network() {
        let temp = TempDir::new().unwrap();
        let config = Config::with_base_dir(temp.path()).url_override("http://127.0.0.1:9/none");
        let resolver = Resolver::for_platform(config, Platform::Linux);

        let install_dir = resolver.install_dir().unwrap();
        let exe = install_dir.join("usr/bin/dot");
        std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
        std::fs::write(&exe, "#!/bin/sh\nexit 0\n").unwrap();
        fs_utils::set_mode(&exe, 0o644).unwrap();
        marker::mark_installed(&install_dir, "linux", "http://x").unwrap();

        let resolution = resolver.resolve().unwrap();
        assert_eq!(resolution.executable, exe);
        assert!(fs_utils::is_readable_executable(&exe));
        assert!(temp.path().join("lock.file").exists());
    }

    #[test]
    fn test_failed_install_is_wrapped_and_leaves_no_marker() {
        let temp = TempDir::new().unwrap();
        let config = Config::with_base_dir(temp.path())
            .url_override("http://127.0.0.1:9/graphviz.deb")
            .download_timeout(std::time::Duration::from_secs(2));
        let resolver = Resolver::for_platform(config, Platform::Linux);

        let err = resolver.resolve().unwrap_err();
        match &err {
            Error::InstallFailed { url, .. } => assert_eq!(url, "http://127.0.0.1:9/graphviz.deb"),
            other => panic!("expected InstallFailed, got {other:?}"),
        }
        assert!(matches!(err.root(), Error::Network { .. } | Error::Timeout { .. }));
        assert!(!resolver.is_installed().unwrap());
    }
}
