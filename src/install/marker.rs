//! Install completion marker
//!
//! `installed.crumb` inside the install directory means "extraction finished
//! and the executable was found". It is written as the very last step of an
//! install, through a temporary file and a rename, so it is never observed
//! half-written. A crash before that point leaves no marker and the next run
//! simply installs again.
//!
//! The content is a small versioned TOML document. Only its existence decides
//! whether the cache is used, except that a marker written under a newer or
//! older schema is treated as stale.

use crate::error::{Error, IoResultExt, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the marker inside the install directory
pub const MARKER_FILE: &str = "installed.crumb";

/// Current marker layout
pub const MARKER_SCHEMA: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallMarker {
    pub schema: u32,
    pub platform: String,
    pub source_url: String,
    pub installed_at: DateTime<Utc>,
}

pub fn marker_path(dir: &Path) -> PathBuf {
    dir.join(MARKER_FILE)
}

/// Existence check only; no network, no extraction.
pub fn is_installed(dir: &Path) -> bool {
    marker_path(dir).is_file()
}

/// True if a marker exists but was written under a different schema.
///
/// Markers that are not TOML at all (hand-written or from older tooling) are
/// not considered stale; their content was never more than informational.
pub fn is_stale(dir: &Path) -> bool {
    matches!(read_marker(dir), Ok(marker) if marker.schema != MARKER_SCHEMA)
}

/// Installed and written by this schema version.
pub fn is_current(dir: &Path) -> bool {
    is_installed(dir) && !is_stale(dir)
}

pub fn read_marker(dir: &Path) -> Result<InstallMarker> {
    let path = marker_path(dir);
    let content =
        std::fs::read_to_string(&path).io_context(|| format!("cannot read {}", path.display()))?;
    toml::from_str(&content).map_err(|e| Error::Marker {
        path,
        reason: e.to_string(),
    })
}

/// Record a completed install. Must be the last step of a successful install.
pub fn mark_installed(dir: &Path, platform: &str, source_url: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .io_context(|| format!("cannot create directory {}", dir.display()))?;

    let marker = InstallMarker {
        schema: MARKER_SCHEMA,
        platform: platform.to_string(),
        source_url: source_url.to_string(),
        installed_at: Utc::now(),
    };
    let body = toml::to_string(&marker).map_err(|e| Error::Marker {
        path: marker_path(dir),
        reason: e.to_string(),
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .io_context(|| format!("cannot create temporary file in {}", dir.display()))?;
    writeln!(tmp, "# Installed from {} on {}", source_url, marker.installed_at)
        .and_then(|_| tmp.write_all(body.as_bytes()))
        .and_then(|_| tmp.as_file().sync_all())
        .io_context(|| "cannot write install marker")?;

    let path = marker_path(dir);
    tmp.persist(&path)
        .map_err(|e| Error::io(format!("cannot write {}", path.display()), e.error))?;

    Ok(())
}
