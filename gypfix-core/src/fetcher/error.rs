//! Error type for the fetcher.

use thiserror::Error;

/// Errors that can occur while fetching and installing a release.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed with status {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Download domain not allowed: {0}")]
    DomainNotAllowed(String),

    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("Member not found in archive: {0}")]
    MemberNotFound(String),

    #[error("Unsupported archive: {0}")]
    UnsupportedArchive(String),

    #[error("SHA256 checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("{program} exited with {}", describe_code(.code))]
    ProcessFailed { program: String, code: Option<i32> },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl FetchError {
    /// Exit code a front-end should propagate for this error.
    ///
    /// A failed external process hands its own status through; everything
    /// else is a plain failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ProcessFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}
