//! Shared setup for the gypfix binaries.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use gypfix_core::fetcher::paths::default_install_dir;
use gypfix_core::fetcher::{FetchError, FetchSettings, Release, DEFAULT_BASE_URL, DEFAULT_VERSION};

/// Installs the `tracing` subscriber used by every binary.
///
/// `RUST_LOG` is honored; gypfix crates log at debug, everything else at info.
pub fn init_logging() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "gypfix=debug".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter.add_directive(tracing::Level::INFO.into()))
        .init();
}

/// Exit code for a failed run: the status of a failed external process, 1
/// for anything else.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let code = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<FetchError>())
        .map_or(1, FetchError::exit_code);
    u8::try_from(code).ok().filter(|code| *code != 0).unwrap_or(1)
}

/// Logs `result`'s error chain and converts it into the process exit code.
pub fn finish(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Command line of `install-git-lfs`. Every option has a default.
#[derive(Debug, Parser)]
#[command(name = "install-git-lfs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Download and install a pinned git-lfs release into ~/bin")]
pub struct FetchArgs {
    /// git-lfs release to install
    #[arg(long = "lfs-version", env = "GIT_LFS_VERSION", default_value = DEFAULT_VERSION)]
    pub lfs_version: String,

    /// Base URL of the release downloads
    #[arg(long, env = "GIT_LFS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Install directory (defaults to ~/bin)
    #[arg(long)]
    pub install_dir: Option<PathBuf>,

    /// Expected SHA256 of the release archive
    #[arg(long)]
    pub sha256: Option<String>,
}

impl FetchArgs {
    /// Converts the command line into fetch settings for this platform.
    pub fn into_settings(self) -> Result<FetchSettings> {
        let install_dir = match self.install_dir {
            Some(dir) => dir,
            None => default_install_dir().context("Could not determine home directory")?,
        };
        let mut settings = FetchSettings::new(Release::new(self.lfs_version, self.base_url), install_dir);
        settings.expected_sha256 = self.sha256.map(|sha| sha.to_ascii_lowercase());
        Ok(settings)
    }
}
