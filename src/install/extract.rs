//! Native archive extraction (no external tools needed)
//!
//! Tar streams (plain or gz/xz/bz2/zst compressed) and zip files. Entry paths
//! that would land outside the destination are rejected. Links whose target
//! escapes the destination are skipped: distribution packages routinely carry
//! absolute symlinks into `/usr/share/doc` that have no meaning in a private
//! install tree.

use crate::core::output;
use crate::error::{Error, IoResultExt, Result};
use crate::internal::fs_utils;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// Compression wrapped around a tar stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TarCompression {
    None,
    Gzip,
    Xz,
    Bzip2,
    Zstd,
}

impl TarCompression {
    /// Detect compression from a name like `data.tar.xz` or `foo.tgz`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::Gzip)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(Self::Xz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(Self::Bzip2)
        } else if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
            Some(Self::Zstd)
        } else if name.ends_with(".tar") {
            Some(Self::None)
        } else {
            None
        }
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    // Lexical normalization only; symlinks are never followed here.
    let mut out = PathBuf::new();
    let mut has_root = false;

    for c in path.components() {
        match c {
            Component::Prefix(p) => {
                out.clear();
                out.push(p.as_os_str());
                has_root = true;
            }
            Component::RootDir => {
                out.push(Component::RootDir.as_os_str());
                has_root = true;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = out
                    .components()
                    .next_back()
                    .is_some_and(|last| matches!(last, Component::Normal(_)));
                if popped {
                    out.pop();
                } else if !has_root {
                    out.push("..");
                }
            }
            Component::Normal(seg) => out.push(seg),
        }
    }

    out
}

fn ensure_no_symlink_components(dest: &Path, full_path: &Path) -> Result<()> {
    let rel = full_path.strip_prefix(dest).map_err(|_| {
        Error::ArchiveFormat(format!(
            "entry outside destination: {}",
            full_path.display()
        ))
    })?;

    // Writing through an existing symlink could escape `dest`.
    let mut cur = dest.to_path_buf();
    for comp in rel.components() {
        cur.push(comp);
        if let Ok(md) = std::fs::symlink_metadata(&cur)
            && md.file_type().is_symlink()
        {
            return Err(Error::ArchiveFormat(format!(
                "extraction blocked: symlink in path component: {}",
                cur.display()
            )));
        }
    }

    Ok(())
}

fn link_target_within_dest(dest: &Path, link_parent: &Path, link_name: &Path) -> bool {
    if link_name.is_absolute()
        || link_name
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return false;
    }

    let candidate = normalize_lexical(&link_parent.join(link_name));
    candidate.starts_with(normalize_lexical(dest))
}

/// Unpack a tar stream into `dest`.
pub fn extract_tar<R: Read>(reader: R, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .io_context(|| format!("cannot create directory {}", dest.display()))?;

    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_permissions(true);

    let entries = archive
        .entries()
        .map_err(|e| Error::ArchiveFormat(format!("tar read error: {}", e)))?;

    for entry in entries {
        let mut entry =
            entry.map_err(|e| Error::ArchiveFormat(format!("tar entry error: {}", e)))?;

        let path = entry
            .path()
            .map_err(|e| Error::ArchiveFormat(format!("tar path error: {}", e)))?
            .into_owned();

        if !fs_utils::is_safe_path(&path) {
            return Err(Error::ArchiveFormat(format!(
                "tar contains unsafe path: {}",
                path.display()
            )));
        }

        // Debian data tarballs start with a "./" entry
        if normalize_lexical(&path).as_os_str().is_empty() {
            continue;
        }

        let full_path = dest.join(&path);
        if let Some(parent) = full_path.parent() {
            ensure_no_symlink_components(dest, parent)?;
        }

        let entry_type = entry.header().entry_type();
        if entry_type == tar::EntryType::Symlink || entry_type == tar::EntryType::Link {
            let link_name = entry
                .link_name()
                .map_err(|e| Error::ArchiveFormat(format!("tar link_name error: {}", e)))?
                .map(|l| l.into_owned());
            let link_parent = full_path.parent().unwrap_or(dest);
            // Hard link targets are relative to the archive root, symlinks to their parent
            let within = match (&link_name, entry_type) {
                (Some(target), tar::EntryType::Link) => link_target_within_dest(dest, dest, target),
                (Some(target), _) => link_target_within_dest(dest, link_parent, target),
                (None, _) => false,
            };
            if !within {
                output::detail(&format!(
                    "skipping link {} -> {}",
                    path.display(),
                    link_name
                        .as_deref()
                        .map(|l| l.display().to_string())
                        .unwrap_or_default()
                ));
                continue;
            }
        }

        // Re-extraction over an earlier install: replace the link, never write through it
        if std::fs::symlink_metadata(&full_path).is_ok_and(|md| md.file_type().is_symlink()) {
            fs_utils::remove_file_if_exists(&full_path)?;
        }

        entry
            .unpack_in(dest)
            .io_context(|| format!("unpack error for {}", path.display()))?;
    }

    Ok(())
}

/// Unpack a (possibly compressed) tar file into `dest`.
pub fn extract_tar_file(archive_path: &Path, compression: TarCompression, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .io_context(|| format!("cannot open {}", archive_path.display()))?;
    let reader = BufReader::new(file);

    match compression {
        TarCompression::None => extract_tar(reader, dest),
        TarCompression::Gzip => extract_tar(flate2::read::GzDecoder::new(reader), dest),
        TarCompression::Xz => extract_tar(xz2::read::XzDecoder::new(reader), dest),
        TarCompression::Bzip2 => extract_tar(bzip2::read::BzDecoder::new(reader), dest),
        TarCompression::Zstd => {
            let decoder = zstd::stream::read::Decoder::new(reader)
                .map_err(|e| Error::ArchiveFormat(format!("zstd init error: {}", e)))?;
            extract_tar(decoder, dest)
        }
    }
}

/// Extract a zip archive into `dest`.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .io_context(|| format!("cannot open {}", archive_path.display()))?;

    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| Error::ArchiveFormat(format!("zip read error: {}", e)))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| Error::ArchiveFormat(format!("zip entry error: {}", e)))?;

        let Some(outpath) = file.enclosed_name().map(|p| dest.join(p)) else {
            return Err(Error::ArchiveFormat(format!(
                "zip contains unsafe path: {}",
                file.name()
            )));
        };

        if file.is_dir() {
            std::fs::create_dir_all(&outpath)
                .io_context(|| format!("cannot create directory {}", outpath.display()))?;
            continue;
        }

        fs_utils::ensure_parent_dir(&outpath)?;
        // A previous install may have left a read-only copy behind
        fs_utils::remove_file_if_exists(&outpath)?;

        let mut outfile = File::create(&outpath)
            .io_context(|| format!("cannot create {}", outpath.display()))?;
        std::io::copy(&mut file, &mut outfile)
            .io_context(|| format!("write error for {}", outpath.display()))?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            fs_utils::set_mode(&outpath, mode & 0o7777)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *content).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_compression_from_name() {
        assert_eq!(TarCompression::from_name("data.tar"), Some(TarCompression::None));
        assert_eq!(TarCompression::from_name("data.tar.gz"), Some(TarCompression::Gzip));
        assert_eq!(TarCompression::from_name("data.tar.xz"), Some(TarCompression::Xz));
        assert_eq!(TarCompression::from_name("data.tar.bz2"), Some(TarCompression::Bzip2));
        assert_eq!(TarCompression::from_name("data.tar.zst"), Some(TarCompression::Zstd));
        assert_eq!(TarCompression::from_name("foo.TGZ"), Some(TarCompression::Gzip));
        assert_eq!(TarCompression::from_name("control.txt"), None);
    }

    #[test]
    fn test_extract_tar_gz_nested() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("nested.tar.gz");
        let extract_dir = temp_dir.path().join("extracted");
        write_tar_gz(&archive_path, &[("./usr/bin/dot", b"binary")]);

        std::fs::create_dir_all(&extract_dir).unwrap();
        extract_tar_file(&archive_path, TarCompression::Gzip, &extract_dir).unwrap();

        assert_eq!(
            std::fs::read_to_string(extract_dir.join("usr/bin/dot")).unwrap(),
            "binary"
        );
    }

    #[test]
    fn test_extract_tar_xz() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("data.tar.xz");
        let extract_dir = temp_dir.path().join("extracted");

        let file = File::create(&archive_path).unwrap();
        let encoder = xz2::write::XzEncoder::new(file, 6);
        let mut builder = tar::Builder::new(encoder);
        let content = b"xz content";
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, "usr/bin/dot", &content[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        extract_tar_file(&archive_path, TarCompression::Xz, &extract_dir).unwrap();
        assert!(extract_dir.join("usr/bin/dot").is_file());
    }

    #[test]
    fn test_extract_tar_rejects_parent_dir_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let extract_dir = temp_dir.path().join("extracted");
        std::fs::create_dir_all(&extract_dir).unwrap();

        // tar::Builder refuses ".." so write the raw header name directly
        let mut data = Vec::new();
        {
            let mut builder = tar::Builder::new(&mut data);
            let mut header = tar::Header::new_old();
            header.as_old_mut().name[..10].copy_from_slice(b"../evil.sh");
            header.set_size(4);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append(&header, &b"evil"[..]).unwrap();
            builder.finish().unwrap();
        }

        let err = extract_tar(&data[..], &extract_dir).unwrap_err();
        assert!(matches!(err, Error::ArchiveFormat(_)), "{err:?}");
        assert!(!temp_dir.path().join("evil.sh").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_tar_skips_absolute_symlink() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("links.tar.gz");
        let extract_dir = temp_dir.path().join("extracted");

        let file = File::create(&archive_path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let mut link_header = tar::Header::new_gnu();
        link_header.set_entry_type(tar::EntryType::Symlink);
        link_header.set_size(0);
        link_header.set_mode(0o777);
        link_header.set_cksum();
        link_header.set_link_name("/usr/share/doc/libgvc6").unwrap();
        builder
            .append_data(&mut link_header, "usr/share/doc/graphviz", std::io::empty())
            .unwrap();

        let mut rel_header = tar::Header::new_gnu();
        rel_header.set_entry_type(tar::EntryType::Symlink);
        rel_header.set_size(0);
        rel_header.set_mode(0o777);
        rel_header.set_cksum();
        rel_header.set_link_name("dot").unwrap();
        builder
            .append_data(&mut rel_header, "usr/bin/neato", std::io::empty())
            .unwrap();

        let content = b"dot";
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, "usr/bin/dot", &content[..]).unwrap();

        builder.into_inner().unwrap().finish().unwrap();

        extract_tar_file(&archive_path, TarCompression::Gzip, &extract_dir).unwrap();

        assert!(extract_dir.join("usr/bin/dot").is_file());
        assert!(
            std::fs::symlink_metadata(extract_dir.join("usr/bin/neato"))
                .unwrap()
                .file_type()
                .is_symlink()
        );
        assert!(std::fs::symlink_metadata(extract_dir.join("usr/share/doc/graphviz")).is_err());
    }

    #[test]
    fn test_extract_zip_with_nested_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("nested.zip");
        let extract_dir = temp_dir.path().join("extracted");

        let file = File::create(&archive_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        zip.add_directory("Graphviz/bin/", options).unwrap();
        zip.start_file("Graphviz/bin/dot.exe", options).unwrap();
        zip.write_all(b"MZ").unwrap();
        zip.finish().unwrap();

        std::fs::create_dir_all(&extract_dir).unwrap();
        extract_zip(&archive_path, &extract_dir).unwrap();

        assert_eq!(
            std::fs::read(extract_dir.join("Graphviz/bin/dot.exe")).unwrap(),
            b"MZ"
        );
    }

    #[test]
    fn test_extract_zip_overwrites_previous_install() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("again.zip");
        let extract_dir = temp_dir.path().join("extracted");

        let file = File::create(&archive_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("dot", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"new").unwrap();
        zip.finish().unwrap();

        std::fs::create_dir_all(&extract_dir).unwrap();
        std::fs::write(extract_dir.join("dot"), "old").unwrap();
        fs_utils::set_mode(&extract_dir.join("dot"), 0o555).unwrap();

        extract_zip(&archive_path, &extract_dir).unwrap();
        assert_eq!(std::fs::read_to_string(extract_dir.join("dot")).unwrap(), "new");
    }

    #[test]
    fn test_extract_zip_rejects_garbage() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("broken.zip");
        std::fs::write(&archive_path, b"this is not a zip").unwrap();

        let err = extract_zip(&archive_path, temp_dir.path()).unwrap_err();
        assert!(matches!(err, Error::ArchiveFormat(_)));
    }
}
