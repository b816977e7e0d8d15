//! Error types for fetching and installing Graphviz.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while resolving the `dot` executable.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no prebuilt graphviz is registered for platform '{0}'")]
    UnsupportedPlatform(String),

    #[error("download of {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("download of {url} timed out: no data for {}s", .after.as_secs())]
    Timeout { url: String, after: Duration },

    #[error("unexpected archive layout: {0}")]
    ArchiveFormat(String),

    #[error("'{name}' not found under {}", .root.display())]
    ExecutableNotFound { name: String, root: PathBuf },

    #[error("{} is not readable and executable", .0.display())]
    NotExecutable(PathBuf),

    #[error("could not acquire install lock {} within {}s", .path.display(), .waited.as_secs())]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("installing from {url} failed: {source}")]
    InstallFailed {
        url: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid install marker {}: {reason}", .path.display())]
    Marker { path: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Attach a human readable context to an I/O failure.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// The innermost error, looking through `InstallFailed` wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::InstallFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Extension for attaching context to `std::io::Result`.
pub(crate) trait IoResultExt<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::io(f(), e))
    }
}
