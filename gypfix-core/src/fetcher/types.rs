//! Core types for the git-lfs fetcher.
//!
//! This module defines platform detection and archive formats. Platform
//! selection is deliberately coarse: the fetcher only distinguishes Windows
//! from everything else.

use std::fmt;

// ============================================================================
// Platform Detection
// ============================================================================

/// The platform family the fetcher installs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Windows: zip archive, 7-Zip extraction, `git-lfs.exe install`.
    Windows,
    /// Any other OS: tar.gz archive, bundled `install.sh`.
    Unix,
}

impl Platform {
    /// Maps an OS identifier (as in `std::env::consts::OS`) to a platform.
    pub fn from_os(os: &str) -> Self {
        if os == "windows" {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Detects the current platform at runtime.
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Returns a human-readable description of the platform.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Unix => "Unix",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Archive Format
// ============================================================================

/// Archive format of a downloaded release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Gzip-compressed tar archive (.tar.gz, .tgz)
    TarGz,
    /// ZIP archive (.zip)
    Zip,
}

impl ArchiveFormat {
    /// Infers the archive format from a URL or filename.
    pub fn from_url(url: &str) -> Option<Self> {
        let lower = url.to_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if lower.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}
