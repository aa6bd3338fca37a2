//! gypfix Core Library
//!
//! Build tooling for the native JavaScript engine bindings. It includes:
//!
//! - A fetcher that installs a pinned git-lfs release into `~/bin`
//! - A minimal build-file generator (ndk-build Makefiles, Visual Studio
//!   projects) with two patches:
//!   - link order for manually built static libraries
//!   - keeping parameter tokens out of project path fixup

pub mod fetcher;
pub mod generator;

// Re-export fetcher
pub use fetcher::{
    download_file, DownloadProgress, FetchError, FetchSettings, Fetcher, Platform,
    ProgressReporter, Release,
};

// Re-export generator
pub use generator::{
    run_make, run_msvs, GenerateError, GeneratorArgs, KeepNonPathTokens, LinkOrderPatch,
    MakefileWriter, MsvsPathFixer, NdkMakefileWriter, PathFixer,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
