//! Visual Studio project emission.

use super::spec::{Action, BuildConfigs, TargetSpec, TargetType};

/// Rewrites a path from a target file into project-file form.
pub trait PathFixer {
    fn fix_path(&self, path: &str) -> String;
}

impl<F: PathFixer + ?Sized> PathFixer for &F {
    fn fix_path(&self, path: &str) -> String {
        (**self).fix_path(path)
    }
}

// ============================================================================
// Default Fixup
// ============================================================================

/// Relative-path fixup used for every path written into a project.
///
/// Relative paths are joined onto the optional prefix, separators become
/// backslashes and the result is normalized. Normalization is skipped when it
/// would drop or add a `$`, so macro references such as `$(OutDir)\..\x`
/// survive intact.
#[derive(Debug, Clone, Default)]
pub struct MsvsPathFixer {
    prefix: Option<String>,
}

impl MsvsPathFixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixer joining relative paths onto `prefix` (the target file's
    /// directory relative to the project).
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

impl PathFixer for MsvsPathFixer {
    fn fix_path(&self, path: &str) -> String {
        let joined = match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() && is_relative(path) => join(prefix, path),
            _ => path.to_string(),
        };
        let mut fixed = normalized_source(&joined.replace('/', "\\"));
        if fixed.ends_with('\\') {
            fixed.pop();
        }
        fixed
    }
}

fn has_drive(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// True for non-empty paths that are not absolute and don't start with `$`.
fn is_relative(path: &str) -> bool {
    !path.is_empty() && !path.starts_with(['/', '\\', '$']) && !has_drive(path)
}

fn join(prefix: &str, path: &str) -> String {
    if prefix.ends_with(['/', '\\']) {
        format!("{}{}", prefix, path)
    } else {
        format!("{}\\{}", prefix, path)
    }
}

/// Normalizes `path` unless that changes how many `$` it contains.
fn normalized_source(path: &str) -> String {
    let normalized = normpath(path);
    if normalized.matches('$').count() == path.matches('$').count() {
        normalized
    } else {
        path.to_string()
    }
}

/// Windows path normalization on a backslash-separated path.
fn normpath(path: &str) -> String {
    let (drive, rest) = if has_drive(path) {
        path.split_at(2)
    } else {
        ("", path)
    };

    let mut root = drive.to_string();
    let rest = if rest.starts_with('\\') {
        root.push('\\');
        rest.trim_start_matches('\\')
    } else {
        rest
    };
    let rooted = root.ends_with('\\');

    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split('\\') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            _ => parts.push(part),
        }
    }

    if root.is_empty() && parts.is_empty() {
        return ".".to_string();
    }
    root + &parts.join("\\")
}

// ============================================================================
// Project Writer
// ============================================================================

const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

const HEADER_EXTENSIONS: &[&str] = &[".h", ".hh", ".hpp", ".hxx"];
const COMPILE_EXTENSIONS: &[&str] = &[".c", ".cc", ".cpp", ".cxx"];

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Writes a minimal MSBuild project for one target. Every path and action
/// argument goes through the injected `PathFixer`.
#[derive(Debug, Clone)]
pub struct ProjectWriter<F> {
    fixer: F,
}

impl<F: PathFixer> ProjectWriter<F> {
    pub fn new(fixer: F) -> Self {
        Self { fixer }
    }

    /// Renders the project for `target`.
    pub fn write(&self, target: &TargetSpec, configs: &BuildConfigs) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        out.push_str(&format!(
            "<Project DefaultTargets=\"Build\" ToolsVersion=\"4.0\" xmlns=\"{}\">\n",
            MSBUILD_NAMESPACE
        ));

        out.push_str("  <PropertyGroup Label=\"Globals\">\n");
        out.push_str(&format!(
            "    <RootNamespace>{}</RootNamespace>\n",
            escape_xml(&target.target_name)
        ));
        out.push_str(&format!(
            "    <ConfigurationType>{}</ConfigurationType>\n",
            configuration_type(target.target_type)
        ));
        out.push_str("  </PropertyGroup>\n");

        for (name, settings) in configs {
            let includes: Vec<String> = settings
                .include_dirs
                .iter()
                .map(|dir| self.fixer.fix_path(dir))
                .collect();
            out.push_str(&format!(
                "  <ItemDefinitionGroup Condition=\"'$(Configuration)'=='{}'\">\n",
                escape_xml(name)
            ));
            out.push_str("    <ClCompile>\n");
            out.push_str(&format!(
                "      <AdditionalIncludeDirectories>{}</AdditionalIncludeDirectories>\n",
                escape_xml(&with_inherited(&includes, "AdditionalIncludeDirectories"))
            ));
            out.push_str(&format!(
                "      <PreprocessorDefinitions>{}</PreprocessorDefinitions>\n",
                escape_xml(&with_inherited(&settings.defines, "PreprocessorDefinitions"))
            ));
            out.push_str("    </ClCompile>\n");
            out.push_str("  </ItemDefinitionGroup>\n");
        }

        if !target.sources.is_empty() {
            out.push_str("  <ItemGroup>\n");
            for source in &target.sources {
                out.push_str(&format!(
                    "    <{} Include=\"{}\" />\n",
                    source_item(source),
                    escape_xml(&self.fixer.fix_path(source))
                ));
            }
            out.push_str("  </ItemGroup>\n");
        }

        if !target.actions.is_empty() {
            out.push_str("  <ItemGroup>\n");
            for action in &target.actions {
                self.write_action(&mut out, action);
            }
            out.push_str("  </ItemGroup>\n");
        }

        out.push_str("  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.targets\" />\n");
        out.push_str("</Project>\n");
        out
    }

    fn write_action(&self, out: &mut String, action: &Action) {
        let Some((primary, rest)) = action.inputs.split_first() else {
            return;
        };
        let fix_all = |paths: &[String]| -> String {
            paths
                .iter()
                .map(|path| self.fixer.fix_path(path))
                .collect::<Vec<_>>()
                .join(";")
        };

        out.push_str(&format!(
            "    <CustomBuild Include=\"{}\">\n",
            escape_xml(&self.fixer.fix_path(primary))
        ));
        out.push_str(&format!(
            "      <Message>{}</Message>\n",
            escape_xml(&action.action_name)
        ));
        out.push_str(&format!(
            "      <Command>{}</Command>\n",
            escape_xml(&self.command_line(&action.action))
        ));
        out.push_str(&format!(
            "      <AdditionalInputs>{}</AdditionalInputs>\n",
            escape_xml(&fix_all(rest))
        ));
        out.push_str(&format!(
            "      <Outputs>{}</Outputs>\n",
            escape_xml(&fix_all(&action.outputs))
        ));
        out.push_str("    </CustomBuild>\n");
    }

    /// Builds the command line of an action.
    ///
    /// Arguments starting with `/` or `-` look like switches and are kept;
    /// the rest are fixed as paths. Arguments with spaces are quoted.
    pub fn command_line(&self, command: &[String]) -> String {
        let Some((program, args)) = command.split_first() else {
            return String::new();
        };
        let mut parts = vec![program.replace('/', "\\")];
        parts.extend(args.iter().map(|arg| {
            if arg.starts_with(['/', '-']) {
                arg.clone()
            } else {
                self.fixer.fix_path(arg)
            }
        }));
        parts
            .into_iter()
            .map(|part| {
                if part.contains(' ') {
                    format!("\"{}\"", part)
                } else {
                    part
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn configuration_type(target_type: TargetType) -> &'static str {
    match target_type {
        TargetType::Executable => "Application",
        TargetType::SharedLibrary => "DynamicLibrary",
        TargetType::StaticLibrary => "StaticLibrary",
        TargetType::None => "Utility",
    }
}

fn source_item(source: &str) -> &'static str {
    if HEADER_EXTENSIONS.iter().any(|ext| source.ends_with(ext)) {
        "ClInclude"
    } else if COMPILE_EXTENSIONS.iter().any(|ext| source.ends_with(ext)) {
        "ClCompile"
    } else {
        "None"
    }
}

fn with_inherited(values: &[String], property: &str) -> String {
    let mut items: Vec<String> = values.to_vec();
    items.push(format!("%({})", property));
    items.join(";")
}
