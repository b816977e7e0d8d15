//! Executable discovery
//!
//! Archive layouts differ between platforms and Graphviz versions (`bin/dot`,
//! `usr/bin/dot`, `Graphviz-12.2.1-win32/bin/dot.exe`, ...), so the tree is
//! walked instead of assuming a fixed location.

use crate::core::platform::{EXECUTABLE_NAME, Platform};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Find the executable anywhere under `root`.
///
/// Entries are visited in file-name order so repeated calls over the same
/// tree return the same path.
pub fn find_executable(root: &Path, platform: &Platform) -> Result<PathBuf> {
    let names = platform.executable_names();

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| !entry.file_type().is_dir())
        .find(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| names.iter().any(|n| n == name))
        })
        .map(|entry| entry.into_path())
        .ok_or_else(|| Error::ExecutableNotFound {
            name: EXECUTABLE_NAME.to_string(),
            root: root.to_path_buf(),
        })
}
