//! Common filesystem utilities

use crate::error::{IoResultExt, Result};
use std::path::Path;

/// Ensure a file's parent directory exists.
///
/// Creates the parent directory (and all ancestors) if it doesn't exist.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .io_context(|| format!("cannot create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Remove a file, treating "already gone" as success.
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            Err(e).io_context(|| format!("cannot remove {}", path.display()))
        }
        _ => Ok(()),
    }
}

/// Set file permissions (Unix only).
///
/// No-op on non-Unix platforms.
#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .io_context(|| format!("chmod failed for {}", path.display()))
}

#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// OR `bits` into the current mode of `path`.
///
/// Leaves the file alone when the bits are already set, so a shared install
/// owned by another user still resolves.
#[cfg(unix)]
pub fn add_mode_bits(path: &Path, bits: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(path)
        .io_context(|| format!("cannot stat {}", path.display()))?
        .permissions()
        .mode();
    if mode & bits == bits {
        return Ok(());
    }
    set_mode(path, (mode | bits) & 0o7777)
}

#[cfg(not(unix))]
pub fn add_mode_bits(_path: &Path, _bits: u32) -> Result<()> {
    Ok(())
}

/// Check the calling process may read and execute `path`.
#[cfg(unix)]
pub fn is_readable_executable(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = std::ffi::CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call.
    unsafe { libc::access(c_path.as_ptr(), libc::R_OK | libc::X_OK) == 0 }
}

#[cfg(not(unix))]
pub fn is_readable_executable(path: &Path) -> bool {
    path.is_file()
}

/// Check if path is safe (no path traversal).
///
/// Rejects absolute paths and paths containing "..".
pub fn is_safe_path(path: &Path) -> bool {
    !path.is_absolute()
        && !path
            .components()
            .any(|c| c == std::path::Component::ParentDir)
}
