//! Archive download
//!
//! Streams a remote archive to disk in fixed-size chunks, with a progress bar
//! on stderr. A read that stalls longer than the configured timeout aborts the
//! download with `Error::Timeout`.

use crate::core::output;
use crate::error::{Error, IoResultExt, Result};
use crate::internal::fs_utils;
use crate::internal::progress::{self, ProgressGuard};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Chunk size for the read/write loop (256 KiB)
const CHUNK_SIZE: usize = 256 * 1024;

/// Download `url` to `dest`, creating parent directories as needed.
///
/// Returns `dest` on success. HTTP error statuses and transport failures are
/// `Error::Network`; a stalled connection is `Error::Timeout`.
pub fn download(url: &str, dest: &Path, timeout: Duration) -> Result<PathBuf> {
    fs_utils::ensure_parent_dir(dest)?;

    let filename = dest
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());

    output::detail(&format!("downloading {} -> {}", url, dest.display()));
    let total_bytes = download_with_progress(url, dest, &filename, timeout)?;
    output::detail(&format!("downloaded {} ({} bytes)", filename, total_bytes));

    Ok(dest.to_path_buf())
}

fn download_with_progress(
    url: &str,
    dest: &Path,
    filename: &str,
    timeout: Duration,
) -> Result<u64> {
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .build();

    let response = agent.get(url).call().map_err(|e| map_request_error(url, e, timeout))?;

    let pb = progress::create_spinner(&format!("graphviz: {}", filename));
    let _guard = ProgressGuard::new(&pb);

    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.trim().parse().ok())
    {
        progress::upgrade_to_bytes(&pb, len);
    }

    let mut file = std::fs::File::create(dest)
        .io_context(|| format!("cannot create {}", dest.display()))?;

    let mut reader = response.into_reader();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) if is_timeout_io(&e) => {
                return Err(Error::Timeout {
                    url: url.to_string(),
                    after: timeout,
                });
            }
            Err(e) => {
                return Err(Error::Network {
                    url: url.to_string(),
                    reason: format!("read error: {}", e),
                });
            }
        };

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .io_context(|| format!("write error for {}", dest.display()))?;

        total_bytes += bytes_read as u64;
        pb.set_position(total_bytes);
    }

    file.flush()
        .io_context(|| format!("write error for {}", dest.display()))?;

    Ok(total_bytes)
}

fn map_request_error(url: &str, err: ureq::Error, timeout: Duration) -> Error {
    match err {
        ureq::Error::Status(code, response) => Error::Network {
            url: url.to_string(),
            reason: format!("HTTP {} {}", code, response.status_text()),
        },
        ureq::Error::Transport(transport) => {
            if is_timeout_error(&transport) {
                Error::Timeout {
                    url: url.to_string(),
                    after: timeout,
                }
            } else {
                Error::Network {
                    url: url.to_string(),
                    reason: transport.to_string(),
                }
            }
        }
    }
}

fn is_timeout_io(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    )
}

/// Walk the source chain looking for a timed-out socket operation.
fn is_timeout_error(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>()
            && is_timeout_io(io)
        {
            return true;
        }
        current = e.source();
    }
    false
}
