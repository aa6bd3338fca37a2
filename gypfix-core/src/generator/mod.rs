//! Minimal build-file generator and the patches layered on it.
//!
//! # Architecture
//!
//! - `spec`: Target descriptions loaded from JSON
//! - `makefile`: ndk-build Makefile writer and its extension points
//! - `link_order`: `LinkOrderPatch`, links user libraries after regular deps
//! - `msvs`: Visual Studio project writer and the default path fixup
//! - `path_patch`: `KeepNonPathTokens`, exempts parameter tokens from fixup
//! - `cli`: Command line and entry points used by the wrapper binaries
//!
//! Patches are decorators over the `MakefileWriter` and `PathFixer` traits,
//! so a run is composed by constructing the writer it needs:
//!
//! ```ignore
//! use gypfix_core::generator::{LinkOrderPatch, MakefileWriter, NdkMakefileWriter};
//!
//! let mut writer = LinkOrderPatch::new(NdkMakefileWriter::new());
//! writer.write(&target, &target.configurations)?;
//! ```

pub mod cli;
pub mod error;
pub mod link_order;
pub mod makefile;
pub mod msvs;
pub mod path_patch;
pub mod spec;

// Re-export commonly used types
pub use cli::{generate, run_make, run_msvs, GeneratorArgs, OutputFormat};
pub use error::GenerateError;
pub use link_order::{AppendStaticLibraries, LinkOrderPatch};
pub use makefile::{ListWriter, Makefile, MakefileWriter, NdkMakefileWriter, PlainLists};
pub use msvs::{MsvsPathFixer, PathFixer, ProjectWriter};
pub use path_patch::{KeepNonPathTokens, NON_PATH_TOKENS};
pub use spec::{load_targets, BuildConfigs, ConfigSettings, TargetSpec, TargetType};
