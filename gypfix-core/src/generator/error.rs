//! Error type for build-file generation.

use thiserror::Error;

/// Errors that can occur while generating build files.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid target file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Link-order writer already holds configurations for a target")]
    ConfigsAlreadyCaptured,

    #[error("Module rule written outside of a target write")]
    ConfigsNotCaptured,

    #[error("Invalid define {0:?}, expected NAME or NAME=VALUE")]
    InvalidDefine(String),
}
