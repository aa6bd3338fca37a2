//! Pinned git-lfs fetcher.
//!
//! Downloads a fixed git-lfs release for the running platform and installs it
//! into a user-local binary directory.
//!
//! # Architecture
//!
//! - `types`: Platform detection and archive formats
//! - `release`: Release descriptor (version, URLs, archive members)
//! - `paths`: Staging and install directory resolution
//! - `progress`: Rate-limited progress logging
//! - `downloader`: Async streaming download
//! - `extractor`: tar.gz member extraction and 7-Zip invocation
//! - `process`: Checked external process execution
//! - `installer`: Per-platform install procedures
//! - `manager`: `Fetcher`, the high-level entry point
//!
//! # Example
//!
//! ```ignore
//! use gypfix_core::fetcher::{FetchSettings, Fetcher, Release};
//!
//! let settings = FetchSettings::new(Release::default(), install_dir);
//! let binary = Fetcher::new(settings).run().await?;
//! println!("Installed {}", binary.display());
//! ```

pub mod downloader;
pub mod error;
pub mod extractor;
pub mod installer;
pub mod manager;
pub mod paths;
pub mod process;
pub mod progress;
pub mod release;
pub mod types;

// Re-export commonly used types
pub use downloader::{download_file, DownloadProgress};
pub use error::FetchError;
pub use manager::{FetchSettings, Fetcher};
pub use progress::ProgressReporter;
pub use release::{Release, DEFAULT_BASE_URL, DEFAULT_VERSION};
pub use types::{ArchiveFormat, Platform};
