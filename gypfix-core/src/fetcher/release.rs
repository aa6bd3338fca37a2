//! Release descriptor for the pinned git-lfs build.
//!
//! The version and base URL are parameters rather than constants; the
//! defaults reproduce the release the build has always used.

use url::Url;

use super::error::FetchError;
use super::types::{ArchiveFormat, Platform};

/// Release the fetcher installs when nothing else is configured.
pub const DEFAULT_VERSION: &str = "1.2.1";

/// Where git-lfs publishes its release archives.
pub const DEFAULT_BASE_URL: &str = "https://github.com/github/git-lfs/releases/download";

/// Allowed domains for release downloads.
const ALLOWED_DOMAINS: &[&str] = &["github.com"];

// ============================================================================
// Release
// ============================================================================

/// A pinned git-lfs release: everything needed to locate and unpack it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Release version without the leading `v`.
    pub version: String,
    /// Base URL the `v{version}/...` archive paths hang off.
    pub base_url: String,
}

impl Default for Release {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION, DEFAULT_BASE_URL)
    }
}

impl Release {
    /// Creates a release descriptor.
    pub fn new(version: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// File name of the release archive for a platform.
    pub fn archive_name(&self, platform: Platform) -> String {
        match platform {
            Platform::Windows => format!("git-lfs-windows-amd64-{}.zip", self.version),
            Platform::Unix => format!("git-lfs-linux-amd64-{}.tar.gz", self.version),
        }
    }

    /// Download URL of the release archive for a platform.
    pub fn download_url(&self, platform: Platform) -> String {
        format!(
            "{}/v{}/{}",
            self.base_url,
            self.version,
            self.archive_name(platform)
        )
    }

    /// Archive format for a platform.
    pub fn archive_format(&self, platform: Platform) -> ArchiveFormat {
        match platform {
            Platform::Windows => ArchiveFormat::Zip,
            Platform::Unix => ArchiveFormat::TarGz,
        }
    }

    /// Name of the installed executable.
    pub fn binary_name(&self, platform: Platform) -> &'static str {
        match platform {
            Platform::Windows => "git-lfs.exe",
            Platform::Unix => "git-lfs",
        }
    }

    /// Name of the install script shipped in the Unix archive.
    pub fn install_script_name(&self) -> &'static str {
        "install.sh"
    }

    /// Archive members to extract, as stored in the archive.
    ///
    /// Unix members sit under one top-level directory which extraction
    /// strips; the Windows member is flattened by the archiver.
    pub fn archive_members(&self, platform: Platform) -> Vec<String> {
        match platform {
            Platform::Windows => vec![format!(
                "git-lfs-windows-amd64-{}\\{}",
                self.version,
                self.binary_name(platform)
            )],
            Platform::Unix => {
                let root = format!("git-lfs-{}", self.version);
                vec![
                    format!("{}/{}", root, self.binary_name(platform)),
                    format!("{}/{}", root, self.install_script_name()),
                ]
            }
        }
    }

    /// Returns the download URL for a platform after checking it is safe.
    pub fn resolve_url(&self, platform: Platform) -> Result<String, FetchError> {
        let url = self.download_url(platform);
        validate_url(&url)?;
        Ok(url)
    }
}

// ============================================================================
// URL Security Validation
// ============================================================================

/// Validates that a URL is safe for downloading.
///
/// Checks:
/// - URL scheme must be HTTPS
/// - Host must be in the allowed domain list
pub fn validate_url(url_str: &str) -> Result<(), FetchError> {
    let url = Url::parse(url_str).map_err(|e| FetchError::InvalidUrl {
        url: url_str.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "https" {
        return Err(FetchError::InvalidUrl {
            url: url_str.to_string(),
            reason: "URL must use HTTPS".to_string(),
        });
    }

    let host = url.host_str().ok_or_else(|| FetchError::InvalidUrl {
        url: url_str.to_string(),
        reason: "URL must have a host".to_string(),
    })?;

    let is_allowed = ALLOWED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)));

    if !is_allowed {
        return Err(FetchError::DomainNotAllowed(host.to_string()));
    }

    Ok(())
}
