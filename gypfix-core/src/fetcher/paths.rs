//! Path resolution for downloads and installation.
//!
//! - Staging (downloaded archive): `/tmp` on Unix, `%TEMP%` on Windows
//! - Install directory: `~/bin`

use std::path::{Path, PathBuf};

use super::error::FetchError;
use super::types::Platform;

/// Staging directory used on every non-Windows platform.
const UNIX_STAGING_DIR: &str = "/tmp";

/// Windows environment variable naming the temp directory.
pub const TEMP_ENV: &str = "TEMP";

/// Returns the directory the release archive is downloaded into.
///
/// `env` looks up environment variables; it is a parameter so callers (and
/// tests) decide where values come from.
pub fn staging_dir<F>(platform: Platform, env: F) -> Result<PathBuf, FetchError>
where
    F: Fn(&str) -> Option<String>,
{
    match platform {
        Platform::Windows => env(TEMP_ENV)
            .map(PathBuf::from)
            .ok_or(FetchError::MissingEnv(TEMP_ENV)),
        Platform::Unix => Ok(PathBuf::from(UNIX_STAGING_DIR)),
    }
}

/// Returns the user-local binary directory, `~/bin`.
pub fn default_install_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("bin"))
}

/// Returns where the archive for `url` is stored inside `staging`.
///
/// The file keeps the basename of the URL.
pub fn archive_path(staging: &Path, url: &str) -> PathBuf {
    let name = url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("download");
    staging.join(name)
}

/// Creates `dir` (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), FetchError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}
