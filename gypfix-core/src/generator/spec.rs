//! Target specifications read by the generator.
//!
//! A target file is JSON; one file may hold a single target or a list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::error::GenerateError;

/// Per-configuration settings, keyed by configuration name.
pub type BuildConfigs = BTreeMap<String, ConfigSettings>;

/// Kind of artifact a target produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Executable,
    SharedLibrary,
    StaticLibrary,
    /// Actions only, nothing is linked.
    #[default]
    None,
}

impl TargetType {
    /// Returns true if the target is compiled and linked.
    pub fn is_linkable(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Settings of one build configuration (e.g. `Debug`, `Release`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigSettings {
    #[serde(default)]
    pub defines: Vec<String>,
    #[serde(default)]
    pub cflags: Vec<String>,
    #[serde(default)]
    pub include_dirs: Vec<String>,
    /// Manually built static libraries to link after regular dependencies.
    #[serde(default)]
    pub user_libraries: Option<Vec<String>>,
}

impl ConfigSettings {
    /// Declared user libraries; `None` when absent or empty.
    pub fn user_libraries(&self) -> Option<&[String]> {
        self.user_libraries
            .as_deref()
            .filter(|libs| !libs.is_empty())
    }
}

/// A custom build step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Action {
    pub action_name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    /// Command line, program first.
    #[serde(default)]
    pub action: Vec<String>,
}

/// One build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TargetSpec {
    pub target_name: String,
    #[serde(rename = "type", default)]
    pub target_type: TargetType,
    #[serde(default)]
    pub sources: Vec<String>,
    /// Paths of libraries this target links, e.g. `out/libzip.a`.
    #[serde(default)]
    pub link_deps: Vec<String>,
    #[serde(default)]
    pub configurations: BuildConfigs,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TargetFile {
    Many(Vec<TargetSpec>),
    One(TargetSpec),
}

/// Parses target specs from JSON text.
pub fn parse_targets(json: &str, origin: &str) -> Result<Vec<TargetSpec>, GenerateError> {
    let file: TargetFile = serde_json::from_str(json).map_err(|source| GenerateError::Json {
        path: origin.to_string(),
        source,
    })?;
    Ok(match file {
        TargetFile::Many(targets) => targets,
        TargetFile::One(target) => vec![target],
    })
}

/// Loads target specs from a JSON file.
pub fn load_targets(path: &Path) -> Result<Vec<TargetSpec>, GenerateError> {
    let json = std::fs::read_to_string(path)?;
    parse_targets(&json, &path.display().to_string())
}
