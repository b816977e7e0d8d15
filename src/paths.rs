//! Search-path handling
//!
//! Nothing here touches the process environment. Resolution produces an
//! [`EnvDelta`] (directories to put in front of `PATH`-like variables) and the
//! caller decides where it goes: onto a `Command`, or printed as `KEY=value`
//! lines for a shell to evaluate.

use crate::core::output;
use crate::core::platform::EXECUTABLE_NAME;
use crate::error::{Error, Result};
use crate::resolver::Resolver;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Executable search path
pub const PATH_VAR: &str = "PATH";

/// Dynamic-library search path on Linux
pub const LIBRARY_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// Directories to prepend, per environment variable.
///
/// Variables keep the order they were first added in; each variable's
/// directories keep their insertion order and appear at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDelta {
    entries: Vec<(String, Vec<PathBuf>)>,
}

impl EnvDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `dir` to `var`. Adding the same pair twice is a no-op.
    pub fn prepend(&mut self, var: &str, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        match self.entries.iter_mut().find(|(name, _)| name == var) {
            Some((_, dirs)) => {
                if !dirs.contains(&dir) {
                    dirs.push(dir);
                }
            }
            None => self.entries.push((var.to_string(), vec![dir])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.entries
            .iter()
            .map(|(name, dirs)| (name.as_str(), dirs.as_slice()))
    }

    /// Directories queued for `var`, empty if none.
    pub fn get(&self, var: &str) -> &[PathBuf] {
        self.entries
            .iter()
            .find(|(name, _)| name == var)
            .map(|(_, dirs)| dirs.as_slice())
            .unwrap_or(&[])
    }

    /// The value `var` should take given its `current` value.
    ///
    /// Directories already present in `current` are not added again. Returns
    /// `None` when the delta has nothing for `var`.
    pub fn value_for(&self, var: &str, current: Option<&OsStr>) -> Result<Option<OsString>> {
        let dirs = self.get(var);
        if dirs.is_empty() {
            return Ok(None);
        }

        let existing: Vec<PathBuf> = current
            .map(|value| std::env::split_paths(value).collect())
            .unwrap_or_default();

        let merged: Vec<&Path> = dirs
            .iter()
            .filter(|dir| !existing.contains(dir))
            .map(PathBuf::as_path)
            .chain(existing.iter().map(PathBuf::as_path))
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect();

        std::env::join_paths(merged).map(Some).map_err(|e| {
            Error::io(
                format!("cannot build {}", var),
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            )
        })
    }

    /// Set every variable of the delta on `cmd`, merged with this process's
    /// current values.
    pub fn apply_to_command(&self, cmd: &mut Command) -> Result<()> {
        for (var, value) in self.to_assignments()? {
            cmd.env(var, value);
        }
        Ok(())
    }

    /// `(variable, new value)` pairs against this process's environment.
    pub fn to_assignments(&self) -> Result<Vec<(String, OsString)>> {
        let mut out = Vec::with_capacity(self.entries.len());
        for (var, _) in &self.entries {
            let current = std::env::var_os(var);
            if let Some(value) = self.value_for(var, current.as_deref())? {
                out.push((var.clone(), value));
            }
        }
        Ok(out)
    }
}

/// Outcome of [`PathInjector::add_to_path`].
#[derive(Debug, Clone)]
pub struct PathUpdate {
    /// True when the delta puts a private install in front of `PATH`
    pub modified: bool,
    /// The `dot` that will be found after the update
    pub executable: PathBuf,
    pub env: EnvDelta,
}

/// Makes the resolved `dot` reachable through `PATH`.
#[derive(Debug, Clone)]
pub struct PathInjector {
    resolver: Resolver,
    search_path: Option<OsString>,
}

impl PathInjector {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            search_path: None,
        }
    }

    /// Search path consulted by weak mode instead of this process's `PATH`.
    pub fn search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve `dot` and return the `PATH` update that exposes it.
    ///
    /// In weak mode an existing `dot` on the search path wins: nothing is
    /// downloaded and the returned update is unmodified.
    pub fn add_to_path(&self, weak: bool) -> Result<PathUpdate> {
        if weak && let Some(existing) = self.find_on_search_path() {
            output::detail(&format!("using {} from PATH", existing.display()));
            return Ok(PathUpdate {
                modified: false,
                executable: existing,
                env: EnvDelta::new(),
            });
        }

        let resolution = self.resolver.resolve()?;
        let mut env = resolution.env;
        if let Some(dir) = resolution.executable.parent() {
            env.prepend(PATH_VAR, dir);
        }

        Ok(PathUpdate {
            modified: true,
            executable: resolution.executable,
            env,
        })
    }

    fn find_on_search_path(&self) -> Option<PathBuf> {
        let search_path = self
            .search_path
            .clone()
            .or_else(|| std::env::var_os(PATH_VAR))?;
        let cwd = std::env::current_dir().ok()?;
        which::which_in(EXECUTABLE_NAME, Some(search_path), cwd).ok()
    }
}
