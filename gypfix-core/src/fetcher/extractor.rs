//! Archive member extraction.
//!
//! Unix archives are tar.gz and decoded in-process; only the named members
//! are written, with leading path components stripped. Windows archives are
//! handed to 7-Zip.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

use super::error::FetchError;
use super::process::run_checked;

/// Windows environment variable pointing at `C:\Program Files`.
pub const PROGRAM_FILES_ENV: &str = "PROGRAMFILES";

// ============================================================================
// TAR.GZ Extraction
// ============================================================================

/// Extracts `members` of a tar.gz archive into `dest_dir`.
///
/// Each member is matched by its exact path inside the archive and written
/// to `dest_dir` with its first `strip_components` path components removed.
/// Every requested member must be present.
///
/// # Returns
///
/// The paths written, in archive order.
pub fn extract_tar_members(
    archive_path: &Path,
    dest_dir: &Path,
    members: &[String],
    strip_components: usize,
) -> Result<Vec<PathBuf>, FetchError> {
    info!(
        "Extracting {:?} from {} to {}",
        members,
        archive_path.display(),
        dest_dir.display()
    );

    fs::create_dir_all(dest_dir)?;

    let file = File::open(archive_path)?;
    let decoder = flate2::read::GzDecoder::new(BufReader::new(file));
    extract_members(decoder, dest_dir, members, strip_components)
}

fn extract_members<R: Read>(
    reader: R,
    dest_dir: &Path,
    members: &[String],
    strip_components: usize,
) -> Result<Vec<PathBuf>, FetchError> {
    let wanted: HashSet<&str> = members.iter().map(String::as_str).collect();
    let mut found: HashSet<String> = HashSet::new();
    let mut written = Vec::new();

    let mut archive = tar::Archive::new(reader);
    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let entry_type = entry.header().entry_type();
        let path = entry.path()?.into_owned();
        let name = path.to_string_lossy().replace('\\', "/");

        if !wanted.contains(name.as_str()) {
            continue;
        }

        // Security: only plain files are extracted
        if !entry_type.is_file() {
            warn!("Skipping non-file archive member {:?}", path);
            continue;
        }

        let relative = match stripped_relative_path(&path, strip_components) {
            Some(relative) => relative,
            None => {
                warn!("Skipping unsafe path in tar: {:?}", path);
                continue;
            }
        };

        let dest_path = dest_dir.join(&relative);
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut outfile = File::create(&dest_path)?;
        io::copy(&mut entry, &mut outfile)?;
        outfile.flush()?;

        #[cfg(unix)]
        {
            if let Ok(mode) = entry.header().mode() {
                set_unix_permissions(&dest_path, mode)?;
            }
        }

        debug!("Extracted {} -> {}", name, dest_path.display());
        found.insert(name);
        written.push(dest_path);
    }

    if let Some(missing) = members.iter().find(|m| !found.contains(m.as_str())) {
        return Err(FetchError::MemberNotFound(missing.clone()));
    }

    Ok(written)
}

/// Drops the first `strip` components, rejecting absolute and `..` paths.
fn stripped_relative_path(path: &Path, strip: usize) -> Option<PathBuf> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    let rest: PathBuf = parts.into_iter().skip(strip).collect();
    if rest.as_os_str().is_empty() {
        None
    } else {
        Some(rest)
    }
}

#[cfg(unix)]
fn set_unix_permissions(path: &Path, mode: u32) -> Result<(), FetchError> {
    use std::os::unix::fs::PermissionsExt;

    if mode & 0o111 != 0 {
        fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o755))?;
    }
    Ok(())
}

// ============================================================================
// 7-Zip Extraction (Windows)
// ============================================================================

/// The 7-Zip command-line archiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SevenZip {
    exe: PathBuf,
}

impl SevenZip {
    /// Locates `7z.exe` under `%PROGRAMFILES%\7-Zip`.
    pub fn locate<F>(env: F) -> Result<Self, FetchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let program_files = env(PROGRAM_FILES_ENV).ok_or(FetchError::MissingEnv(PROGRAM_FILES_ENV))?;
        Ok(Self {
            exe: PathBuf::from(program_files).join("7-Zip").join("7z.exe"),
        })
    }

    /// Path of the archiver executable.
    pub fn exe(&self) -> &Path {
        &self.exe
    }

    /// Builds the flat-extract command for one member.
    pub fn extract_command(&self, archive_path: &Path, member: &str, dest_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.exe);
        cmd.arg("e")
            .arg(archive_path)
            .arg(member)
            .arg(format!("-o{}", dest_dir.display()))
            .arg("-y");
        cmd
    }

    /// Extracts `member` into `dest_dir`, dropping its directory part.
    pub fn extract(&self, archive_path: &Path, member: &str, dest_dir: &Path) -> Result<(), FetchError> {
        info!(
            "Extracting {} from {} with {}",
            member,
            archive_path.display(),
            self.exe.display()
        );
        run_checked(&mut self.extract_command(archive_path, member, dest_dir))
    }
}

#[cfg(test)]
pub(crate) mod test_archive {
    //! Builders for tar.gz fixtures.

    use std::fs::File;
    use std::path::Path;

    /// Writes a tar.gz at `path` with `(name, mode, contents)` entries.
    pub(crate) fn write_tar_gz(path: &Path, entries: &[(&str, u32, &str)]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (name, mode, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_path(name).unwrap();
            header.set_size(data.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            builder.append(&header, data.as_bytes()).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
    }
}
