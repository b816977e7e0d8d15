//! Platform identification and the download table
//!
//! Each registered platform maps to exactly one versioned archive. Anything
//! not in the table is an `UnsupportedPlatform` error naming the key.

use crate::error::{Error, Result};
use std::fmt;

/// Windows build, produced by the Graphviz CMake release.
const WIN32_ZIP_URL: &str = "https://github.com/zackees/static-graphviz/raw/refs/heads/main/bins/windows_10_cmake_Release_Graphviz-12.2.1-win32.zip";

/// Ubuntu universe package; its `data.tar.*` carries `usr/bin/dot`.
const LINUX_DEB_URL: &str =
    "http://archive.ubuntu.com/ubuntu/pool/universe/g/graphviz/graphviz_2.42.2-3build2_amd64.deb";

/// Name of the executable being installed, without platform suffix
pub const EXECUTABLE_NAME: &str = "dot";

/// How a platform's archive is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveShape {
    /// A `.zip` whose tree is extracted next to the install directory
    Zip,
    /// A Debian package: `ar` container holding a compressed `data.tar.*`
    Deb,
}

/// Operating-system key, spelled the way the install tree is namespaced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Other(String),
}

impl Platform {
    /// Detect the platform of the running process.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a platform key.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            other => Platform::Other(other.to_string()),
        }
    }

    /// Directory name under `<base>/bin/`.
    pub fn key(&self) -> &str {
        match self {
            Platform::Windows => "win32",
            Platform::Linux => "linux",
            Platform::MacOs => "darwin",
            Platform::Other(os) => os,
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }

    pub fn is_linux(&self) -> bool {
        matches!(self, Platform::Linux)
    }

    /// The registered download URL, or `UnsupportedPlatform`.
    pub fn download_url(&self) -> Result<&'static str> {
        match self {
            Platform::Windows => Ok(WIN32_ZIP_URL),
            Platform::Linux => Ok(LINUX_DEB_URL),
            Platform::MacOs | Platform::Other(_) => {
                Err(Error::UnsupportedPlatform(self.key().to_string()))
            }
        }
    }

    /// Fails with `UnsupportedPlatform` unless the platform is registered.
    pub fn check_supported(&self) -> Result<()> {
        self.download_url().map(|_| ())
    }

    pub fn archive_shape(&self) -> ArchiveShape {
        match self {
            Platform::Linux => ArchiveShape::Deb,
            _ => ArchiveShape::Zip,
        }
    }

    /// File names that count as the executable on this platform.
    pub fn executable_names(&self) -> [String; 2] {
        [
            EXECUTABLE_NAME.to_string(),
            format!("{}.exe", EXECUTABLE_NAME),
        ]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
