//! Platform install branches
//!
//! The platform decides the archive shape:
//!
//! - Zip: downloaded next to the install directory as `<dir>.zip` and
//!   extracted into the install directory's parent. The release zips carry
//!   their own top-level folder, so the tree ends up beside `<dir>`.
//! - Deb: downloaded into the install directory as `graphviz.deb`; its
//!   `data.tar.*` payload is extracted into the install directory.
//!
//! The downloaded archive is removed in both cases. The executable is then
//! searched for under the install directory's parent.

use super::{deb, discover, extract};
use crate::acquire;
use crate::core::output;
use crate::core::platform::{ArchiveShape, Platform};
use crate::error::{IoResultExt, Result};
use crate::internal::{fs_utils, progress};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the downloaded package inside the install directory
const DEB_FILE: &str = "graphviz.deb";

/// Download `url`, unpack it for `platform` and return the executable.
///
/// Does not write the install marker; the caller does that once it has
/// everything it needs.
pub fn install_from_archive(
    platform: &Platform,
    url: &str,
    target_dir: &Path,
    timeout: Duration,
) -> Result<PathBuf> {
    match platform.archive_shape() {
        ArchiveShape::Zip => install_zip(url, target_dir, timeout)?,
        ArchiveShape::Deb => install_deb(url, target_dir, timeout)?,
    }

    discover::find_executable(search_root(target_dir), platform)
}

/// Directory the executable is searched under: the install dir's parent.
pub fn search_root(target_dir: &Path) -> &Path {
    match target_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => target_dir,
    }
}

fn install_zip(url: &str, target_dir: &Path, timeout: Duration) -> Result<()> {
    let zip_path = zip_path_for(target_dir);
    let extract_to = search_root(target_dir);

    fetch(url, &zip_path, timeout)?;

    // Drop the archive even when extraction fails; a retry downloads again.
    let result = progress::with_spinner("extracting graphviz", || {
        output::detail(&format!(
            "extracting {} -> {}",
            zip_path.display(),
            extract_to.display()
        ));
        extract::extract_zip(&zip_path, extract_to)
    });
    fs_utils::remove_file_if_exists(&zip_path)?;
    result?;

    std::fs::create_dir_all(target_dir)
        .io_context(|| format!("cannot create directory {}", target_dir.display()))
}

fn install_deb(url: &str, target_dir: &Path, timeout: Duration) -> Result<()> {
    std::fs::create_dir_all(target_dir)
        .io_context(|| format!("cannot create directory {}", target_dir.display()))?;

    let deb_path = target_dir.join(DEB_FILE);
    fetch(url, &deb_path, timeout)?;

    let result = progress::with_spinner("extracting graphviz", || {
        deb::extract_deb(&deb_path, target_dir)
    });
    fs_utils::remove_file_if_exists(&deb_path)?;
    result
}

/// Download to `dest`, leaving nothing behind on failure
fn fetch(url: &str, dest: &Path, timeout: Duration) -> Result<()> {
    match acquire::download(url, dest, timeout) {
        Ok(_) => Ok(()),
        Err(e) => {
            if let Err(cleanup) = fs_utils::remove_file_if_exists(dest) {
                output::detail(&cleanup.to_string());
            }
            Err(e)
        }
    }
}

/// `<dir>.zip`, keeping any dots already in the directory name
fn zip_path_for(target_dir: &Path) -> PathBuf {
    let mut name = OsString::from(target_dir.as_os_str());
    name.push(".zip");
    PathBuf::from(name)
}
