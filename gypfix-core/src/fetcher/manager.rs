//! Fetcher coordinating download and installation.
//!
//! `Fetcher` is the entry point: it resolves the platform-specific URL and
//! staging path, downloads with rate-limited progress logging, and runs the
//! platform's install procedure. Any failure aborts the run; nothing is
//! rolled back.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use super::downloader::download_with_client;
use super::error::FetchError;
use super::extractor::SevenZip;
use super::installer::{install_unix, install_windows};
use super::paths;
use super::progress::{ProgressReporter, REPORT_INTERVAL};
use super::release::Release;
use super::types::{ArchiveFormat, Platform};

// ============================================================================
// Settings
// ============================================================================

/// Everything a fetch run needs to know.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Release to install.
    pub release: Release,
    /// Target platform.
    pub platform: Platform,
    /// Directory the binary ends up in.
    pub install_dir: PathBuf,
    /// Overrides the platform staging directory for the archive.
    pub staging_dir: Option<PathBuf>,
    /// Expected SHA256 of the archive, lowercase hex.
    pub expected_sha256: Option<String>,
    /// Minimum time between two progress lines.
    pub progress_interval: Duration,
}

impl FetchSettings {
    /// Settings for the current platform installing into `install_dir`.
    pub fn new(release: Release, install_dir: PathBuf) -> Self {
        Self {
            release,
            platform: Platform::detect(),
            install_dir,
            staging_dir: None,
            expected_sha256: None,
            progress_interval: REPORT_INTERVAL,
        }
    }
}

// ============================================================================
// Fetcher
// ============================================================================

/// Downloads and installs one pinned release.
#[derive(Debug)]
pub struct Fetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl Fetcher {
    /// Creates a fetcher with a default HTTP client.
    pub fn new(settings: FetchSettings) -> Self {
        Self::with_client(settings, reqwest::Client::new())
    }

    /// Creates a fetcher using `client` for the download.
    pub fn with_client(settings: FetchSettings, client: reqwest::Client) -> Self {
        Self { settings, client }
    }

    /// Returns the settings this fetcher runs with.
    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Resolves and validates the release URL, then fetches and installs it.
    ///
    /// # Returns
    ///
    /// Path of the installed binary.
    pub async fn run(&self) -> Result<PathBuf, FetchError> {
        let url = self.settings.release.resolve_url(self.settings.platform)?;
        self.fetch_and_install(&url).await
    }

    /// Fetches `url` and installs it. `url` is not validated.
    pub async fn fetch_and_install(&self, url: &str) -> Result<PathBuf, FetchError> {
        let settings = &self.settings;

        let expected_format = settings.release.archive_format(settings.platform);
        if ArchiveFormat::from_url(url) != Some(expected_format) {
            return Err(FetchError::UnsupportedArchive(format!(
                "{} is not a {:?} archive",
                url, expected_format
            )));
        }

        let staging = match &settings.staging_dir {
            Some(dir) => dir.clone(),
            None => paths::staging_dir(settings.platform, |key| std::env::var(key).ok())?,
        };
        paths::ensure_dir(&settings.install_dir)?;

        let archive = paths::archive_path(&staging, url);
        info!("{}\n{}", url, archive.display());

        self.download(url, &archive).await?;

        let binary = self.install(&archive)?;
        info!(
            "git-lfs {} installed to {}",
            settings.release.version,
            binary.display()
        );
        Ok(binary)
    }

    /// Downloads `url` to `archive`, logging progress. The returned reporter
    /// holds the last percentage logged.
    async fn download(&self, url: &str, archive: &Path) -> Result<ProgressReporter, FetchError> {
        let mut reporter = ProgressReporter::new(self.settings.progress_interval);
        let mut last = None;
        download_with_client(
            &self.client,
            url,
            archive,
            self.settings.expected_sha256.as_deref(),
            |progress| {
                reporter.report(&progress);
                last = Some(progress);
            },
        )
        .await?;

        if let Some(progress) = last {
            reporter.complete(&progress);
        }
        Ok(reporter)
    }

    fn install(&self, archive: &Path) -> Result<PathBuf, FetchError> {
        let settings = &self.settings;
        match settings.platform {
            Platform::Unix => install_unix(&settings.release, archive, &settings.install_dir),
            Platform::Windows => {
                let seven_zip = SevenZip::locate(|key| std::env::var(key).ok())?;
                install_windows(&settings.release, archive, &settings.install_dir, &seven_zip)
            }
        }
    }
}
