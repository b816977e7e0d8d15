//! Debian package unpacking
//!
//! A `.deb` is an `ar` container holding `debian-binary`, `control.tar.*` and
//! `data.tar.*`. Only the data member matters here; its compression suffix
//! differs between distributions and releases, so it is found by prefix.

use super::extract::{self, TarCompression};
use crate::core::output;
use crate::error::{Error, IoResultExt, Result};
use crate::internal::fs_utils;
use std::fs::File;
use std::path::Path;

/// Name prefix of the payload member
const DATA_MEMBER_PREFIX: &str = "data.tar";

/// Unpack every member of the outer `ar` container into `dir`.
///
/// Returns the member file names in archive order.
pub fn unpack_ar(deb_path: &Path, dir: &Path) -> Result<Vec<String>> {
    let file =
        File::open(deb_path).io_context(|| format!("cannot open {}", deb_path.display()))?;
    let mut archive = ar::Archive::new(file);
    let mut members = Vec::new();

    while let Some(entry) = archive.next_entry() {
        let mut entry = entry
            .map_err(|e| Error::ArchiveFormat(format!("ar read error in {}: {}", deb_path.display(), e)))?;

        // GNU ar terminates names with '/'
        let name = String::from_utf8_lossy(entry.header().identifier())
            .trim_end_matches('/')
            .to_string();

        let rel = Path::new(&name);
        if name.is_empty() || !fs_utils::is_safe_path(rel) || rel.components().count() != 1 {
            return Err(Error::ArchiveFormat(format!(
                "ar member with unsafe name: {:?}",
                name
            )));
        }

        let out_path = dir.join(rel);
        let mut out = File::create(&out_path)
            .io_context(|| format!("cannot create {}", out_path.display()))?;
        std::io::copy(&mut entry, &mut out)
            .io_context(|| format!("write error for {}", out_path.display()))?;

        members.push(name);
    }

    Ok(members)
}

/// Pick the payload member out of an unpacked container listing.
pub fn find_data_member(members: &[String]) -> Option<&str> {
    members
        .iter()
        .map(String::as_str)
        .find(|name| name.starts_with(DATA_MEMBER_PREFIX))
}

/// Extract the payload of a `.deb` into `target_dir`.
///
/// The container is unpacked into a scratch directory that is removed before
/// returning, whether or not extraction succeeded.
pub fn extract_deb(deb_path: &Path, target_dir: &Path) -> Result<()> {
    let scratch = tempfile::Builder::new()
        .prefix("static-graphviz-deb")
        .tempdir()
        .io_context(|| "cannot create temporary directory")?;

    let members = unpack_ar(deb_path, scratch.path())?;
    let data_member = find_data_member(&members).ok_or_else(|| {
        Error::ArchiveFormat(format!(
            "no {}.* member in {} (found: {})",
            DATA_MEMBER_PREFIX,
            deb_path.display(),
            members.join(", ")
        ))
    })?;

    let compression = TarCompression::from_name(data_member).ok_or_else(|| {
        Error::ArchiveFormat(format!("unknown compression for member {}", data_member))
    })?;

    output::detail(&format!(
        "extracting {} -> {}",
        data_member,
        target_dir.display()
    ));
    let data_path = scratch.path().join(data_member);
    extract::extract_tar_file(&data_path, compression, target_dir)
}
