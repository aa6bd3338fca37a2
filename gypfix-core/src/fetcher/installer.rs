//! Unpacking and installing a downloaded release.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

use super::error::FetchError;
use super::extractor::{extract_tar_members, SevenZip};
use super::process::run_checked;
use super::release::Release;
use super::types::Platform;

/// Environment variable the bundled install script reads its prefix from.
pub const PREFIX_ENV: &str = "PREFIX";

/// Installs from a Unix tar.gz release.
///
/// Extracts the binary and `install.sh` into `install_dir` (dropping the
/// archive's top-level directory), runs the script from `install_dir` with
/// `PREFIX` pointing there, then deletes the script.
///
/// # Returns
///
/// Path of the installed binary.
pub fn install_unix(release: &Release, archive: &Path, install_dir: &Path) -> Result<PathBuf, FetchError> {
    extract_tar_members(archive, install_dir, &release.archive_members(Platform::Unix), 1)?;

    let script = install_dir.join(release.install_script_name());
    info!("Running {} with {}={}", script.display(), PREFIX_ENV, install_dir.display());

    run_checked(
        Command::new("sh")
            .arg(&script)
            .current_dir(install_dir)
            .env(PREFIX_ENV, install_dir),
    )?;

    fs::remove_file(&script)?;

    Ok(install_dir.join(release.binary_name(Platform::Unix)))
}

/// Installs from a Windows zip release.
///
/// Extracts the executable with 7-Zip into `install_dir` and runs
/// `git-lfs.exe install`.
pub fn install_windows(
    release: &Release,
    archive: &Path,
    install_dir: &Path,
    seven_zip: &SevenZip,
) -> Result<PathBuf, FetchError> {
    for member in release.archive_members(Platform::Windows) {
        seven_zip.extract(archive, &member, install_dir)?;
    }

    let exe = install_dir.join(release.binary_name(Platform::Windows));
    info!("Running {} install", exe.display());
    run_checked(Command::new(&exe).arg("install"))?;

    Ok(exe)
}
