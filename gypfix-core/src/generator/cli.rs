//! Generator entry point shared by the wrapper binaries.
//!
//! Each wrapper forwards its command line here unchanged and only decides
//! which writer (make) and path fixer (msvs) the run is composed with.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::GenerateError;
use super::link_order::LinkOrderPatch;
use super::makefile::{MakefileWriter, NdkMakefileWriter};
use super::msvs::{MsvsPathFixer, PathFixer, ProjectWriter};
use super::path_patch::KeepNonPathTokens;
use super::spec::{load_targets, TargetSpec};

/// Build file flavor to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ndk-build Makefiles (`.mk`)
    Make,
    /// Visual Studio projects (`.vcxproj`)
    Msvs,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Make => "mk",
            Self::Msvs => "vcxproj",
        }
    }
}

/// Generator command line.
#[derive(Debug, Clone, Parser)]
#[command(name = "gyp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate build files from JSON target descriptions")]
pub struct GeneratorArgs {
    /// Target description files (JSON)
    #[arg(required = true, value_name = "TARGET_FILE")]
    pub inputs: Vec<PathBuf>,

    /// Directory the generated files are written to
    #[arg(long = "generator-output", default_value = ".")]
    pub generator_output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Make)]
    pub format: OutputFormat,

    /// Variable definitions (NAME or NAME=VALUE)
    #[arg(short = 'D', value_name = "NAME=VALUE")]
    pub defines: Vec<String>,
}

/// Splits `NAME=VALUE`; a bare `NAME` gets an empty value.
pub fn parse_define(raw: &str) -> Result<(String, String), GenerateError> {
    let (name, value) = raw.split_once('=').unwrap_or((raw, ""));
    if name.trim().is_empty() {
        return Err(GenerateError::InvalidDefine(raw.to_string()));
    }
    Ok((name.to_string(), value.to_string()))
}

fn output_path(dir: &Path, target: &TargetSpec, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", target.target_name, format.extension()))
}

/// Generates build files for every target in `args.inputs`.
///
/// Makefiles are written by a fresh writer from `new_writer` per target;
/// projects go through `fixer`.
///
/// # Returns
///
/// Paths of the files written, in input order.
pub fn generate<W, N, F>(args: &GeneratorArgs, mut new_writer: N, fixer: F) -> Result<Vec<PathBuf>>
where
    W: MakefileWriter,
    N: FnMut() -> W,
    F: PathFixer,
{
    for raw in &args.defines {
        let (name, value) = parse_define(raw)?;
        debug!(%name, %value, "Define");
    }

    std::fs::create_dir_all(&args.generator_output).with_context(|| {
        format!(
            "Failed to create output directory {}",
            args.generator_output.display()
        )
    })?;

    let projects = ProjectWriter::new(fixer);
    let mut written = Vec::new();

    for input in &args.inputs {
        let targets = load_targets(input)
            .with_context(|| format!("Failed to load targets from {}", input.display()))?;

        for target in &targets {
            let contents = match args.format {
                OutputFormat::Make => {
                    let mut writer = new_writer();
                    writer
                        .write(target, &target.configurations)
                        .with_context(|| format!("Failed to write Makefile for {}", target.target_name))?;
                    std::mem::take(writer.makefile()).into_string()
                }
                OutputFormat::Msvs => projects.write(target, &target.configurations),
            };

            let path = output_path(&args.generator_output, target, args.format);
            std::fs::write(&path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Generated {}", path.display());
            written.push(path);
        }
    }

    Ok(written)
}

/// Runs the generator with the link-order fix applied to Makefiles.
pub fn run_make(args: &GeneratorArgs) -> Result<Vec<PathBuf>> {
    generate(
        args,
        || LinkOrderPatch::new(NdkMakefileWriter::new()),
        MsvsPathFixer::new(),
    )
}

/// Runs the generator with parameter tokens kept out of project path fixup.
pub fn run_msvs(args: &GeneratorArgs) -> Result<Vec<PathBuf>> {
    generate(
        args,
        NdkMakefileWriter::new,
        KeepNonPathTokens::new(MsvsPathFixer::new()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use tempfile::TempDir;

    const TARGETS: &str = r#"[
        {
            "target_name": "adblockplus",
            "type": "static_library",
            "sources": ["src/JsEngine.cpp"],
            "link_deps": ["out/libv8_base.a"],
            "configurations": {
                "Release": {"user_libraries": ["libv8_libplatform.a"]},
                "Debug": {}
            }
        },
        {
            "target_name": "js2c",
            "actions": [{
                "action_name": "js2c",
                "inputs": ["tools/js2c.py"],
                "outputs": ["gen/libraries.cc"],
                "action": ["python", "tools/js2c.py", "gen/libraries.cc", "CORE", "off"]
            }]
        }
    ]"#;

    fn args_for(temp_dir: &TempDir, format: &str) -> GeneratorArgs {
        let input = temp_dir.path().join("targets.json");
        std::fs::write(&input, TARGETS).unwrap();
        let out = temp_dir.path().join("out");
        GeneratorArgs::try_parse_from([
            OsStr::new("gyp"),
            input.as_os_str(),
            OsStr::new("--generator-output"),
            out.as_os_str(),
            OsStr::new("-f"),
            OsStr::new(format),
            OsStr::new("-DOS=android"),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_args() {
        let args = GeneratorArgs::try_parse_from(["gyp", "a.json", "b.json", "-D", "target_arch=x64"]).unwrap();
        assert_eq!(args.inputs, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(args.format, OutputFormat::Make);
        assert_eq!(args.generator_output, PathBuf::from("."));
        assert_eq!(args.defines, vec!["target_arch=x64".to_string()]);

        assert!(GeneratorArgs::try_parse_from(["gyp"]).is_err());
        assert!(GeneratorArgs::try_parse_from(["gyp", "a.json", "-f", "ninja"]).is_err());
    }

    #[test]
    fn test_parse_define() {
        assert_eq!(parse_define("OS=android").unwrap(), ("OS".to_string(), "android".to_string()));
        assert_eq!(parse_define("flag").unwrap(), ("flag".to_string(), String::new()));
        assert!(matches!(parse_define("=x"), Err(GenerateError::InvalidDefine(_))));
    }

    #[test]
    fn test_run_make_writes_patched_makefiles() {
        let temp_dir = TempDir::new().unwrap();
        let args = args_for(&temp_dir, "make");

        let written = run_make(&args).unwrap();

        let out = temp_dir.path().join("out");
        assert_eq!(written, vec![out.join("adblockplus.mk"), out.join("js2c.mk")]);
        let makefile = std::fs::read_to_string(out.join("adblockplus.mk")).unwrap();
        assert!(makefile.contains("ifeq (${BUILDTYPE}, Release)"));
        assert!(makefile.contains("LOCAL_MODULE := libv8_libplatform.a"));
        assert!(makefile.contains("\tv8_base \\\n\t${USER_STATIC_LIBRARIES_${BUILDTYPE}}\n"));
    }

    #[test]
    fn test_run_msvs_keeps_parameter_tokens() {
        let temp_dir = TempDir::new().unwrap();
        let args = args_for(&temp_dir, "msvs");

        let written = run_msvs(&args).unwrap();

        let project = std::fs::read_to_string(&written[1]).unwrap();
        assert!(written[1].ends_with("js2c.vcxproj"));
        assert!(project.contains("<Command>python tools\\js2c.py gen\\libraries.cc CORE off</Command>"));
    }

    #[test]
    fn test_missing_input_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        let args = GeneratorArgs::try_parse_from([
            OsStr::new("gyp"),
            missing.as_os_str(),
            OsStr::new("--generator-output"),
            temp_dir.path().as_os_str(),
        ])
        .unwrap();

        let err = run_make(&args).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }
}
