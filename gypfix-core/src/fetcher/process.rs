//! Running external processes.

use std::process::Command;
use tracing::debug;

use super::error::FetchError;

/// Runs `cmd` to completion; a non-zero exit is an error.
///
/// The child inherits stdio so its output reaches the user unchanged.
pub fn run_checked(cmd: &mut Command) -> Result<(), FetchError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    debug!(command = ?cmd, "Running external process");

    let status = cmd.status()?;
    if status.success() {
        Ok(())
    } else {
        Err(FetchError::ProcessFailed {
            program,
            code: status.code(),
        })
    }
}
