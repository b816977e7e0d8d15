//! Install lock management
//!
//! Serializes the install-or-reuse decision across processes sharing a base
//! directory. Acquisition waits a bounded time; the caller decides what a
//! timeout means (the resolver goes ahead without the lock).

use crate::error::{Error, IoResultExt, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Delay between attempts while another process holds the lock
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// RAII guard for the install lock, released when dropped.
///
/// The lock file itself is left in place: removing it while another process
/// waits on the same path would let a third process lock a fresh inode.
#[derive(Debug)]
pub struct InstallLock {
    file: File,
    path: PathBuf,
}

impl InstallLock {
    /// Take an exclusive lock on `lock_path`, waiting at most `timeout`.
    ///
    /// Returns `Error::LockTimeout` when another holder keeps it past the
    /// deadline.
    pub fn acquire(lock_path: &Path, timeout: Duration) -> Result<Self> {
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)
                .io_context(|| format!("cannot create directory {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)
            .io_context(|| format!("cannot open lock file {}", lock_path.display()))?;

        let deadline = Instant::now() + timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    return Ok(Self {
                        file,
                        path: lock_path.to_path_buf(),
                    });
                }
                Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {}
                Err(e) => {
                    return Err(Error::io(
                        format!("cannot lock {}", lock_path.display()),
                        e,
                    ));
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::LockTimeout {
                    path: lock_path.to_path_buf(),
                    waited: timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
