//! Makefile emission for Android NDK builds.
//!
//! `MakefileWriter` is the extension point: the target driver
//! (`write_target`) calls back into the writer for the module rule, so a
//! decorator that overrides `write_android_ndk_module_rule` sees that call
//! without touching the base writer. List writes inside the module rule go
//! through a `ListWriter` strategy handed in by the caller.

use std::fmt;

use super::error::GenerateError;
use super::spec::{BuildConfigs, TargetSpec, TargetType};

/// Variable holding the static libraries ndk-build links.
pub const STATIC_LIBRARIES_VAR: &str = "LOCAL_STATIC_LIBRARIES";

/// Variable holding the shared libraries ndk-build links.
pub const SHARED_LIBRARIES_VAR: &str = "LOCAL_SHARED_LIBRARIES";

/// Quotes a single list value for make.
pub type Quoter = fn(&str) -> String;

/// Wraps `value` in double quotes if it contains one, escaping inner quotes.
pub fn quote_if_necessary(value: &str) -> String {
    if value.contains('"') {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

// =============================================================================
// Makefile Sink
// =============================================================================

/// Makefile text being generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Makefile {
    text: String,
}

impl Makefile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `line` and a newline.
    pub fn write_ln(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    /// Writes `variable := v1 v2 ...` with one value per continuation line.
    ///
    /// Each value gets `prefix` prepended and is passed through `quoter`.
    /// An empty list still defines the variable.
    pub fn write_list(&mut self, values: &[String], variable: &str, prefix: &str, quoter: Quoter) {
        let mut line = format!("{} :=", variable);
        if !values.is_empty() {
            let quoted: Vec<String> = values
                .iter()
                .map(|value| quoter(&format!("{}{}", prefix, value)))
                .collect();
            line.push_str(" \\\n\t");
            line.push_str(&quoted.join(" \\\n\t"));
        }
        self.text.push_str(&line);
        self.text.push_str("\n\n");
    }

    /// Generated text so far.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for Makefile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// =============================================================================
// List Writing Strategy
// =============================================================================

/// The list-writing primitive used while a module rule is written.
pub trait ListWriter {
    fn write_list(
        &self,
        makefile: &mut Makefile,
        values: &[String],
        variable: &str,
        prefix: &str,
        quoter: Quoter,
    );
}

/// Writes lists unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainLists;

impl ListWriter for PlainLists {
    fn write_list(
        &self,
        makefile: &mut Makefile,
        values: &[String],
        variable: &str,
        prefix: &str,
        quoter: Quoter,
    ) {
        makefile.write_list(values, variable, prefix, quoter);
    }
}

// =============================================================================
// Writer Interface
// =============================================================================

/// Inputs of the NDK module rule for one target.
#[derive(Debug, Clone, Copy)]
pub struct ModuleRule<'a> {
    pub module_name: &'a str,
    pub target_type: TargetType,
    pub all_sources: &'a [String],
    pub link_deps: &'a [String],
}

impl<'a> ModuleRule<'a> {
    pub fn for_target(target: &'a TargetSpec) -> Self {
        Self {
            module_name: &target.target_name,
            target_type: target.target_type,
            all_sources: &target.sources,
            link_deps: &target.link_deps,
        }
    }
}

/// Writes one target's Makefile.
pub trait MakefileWriter {
    /// The Makefile being written.
    fn makefile(&mut self) -> &mut Makefile;

    /// Writes the whole target.
    fn write(&mut self, target: &TargetSpec, configs: &BuildConfigs) -> Result<(), GenerateError> {
        write_target(self, target, configs)
    }

    /// Writes the ndk-build module definition, using `lists` for list writes.
    fn write_android_ndk_module_rule(
        &mut self,
        rule: &ModuleRule<'_>,
        lists: &dyn ListWriter,
    ) -> Result<(), GenerateError> {
        write_module_rule(self.makefile(), rule, lists);
        Ok(())
    }
}

/// The unmodified Makefile writer.
#[derive(Debug, Default)]
pub struct NdkMakefileWriter {
    makefile: Makefile,
}

impl NdkMakefileWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_makefile(self) -> Makefile {
        self.makefile
    }
}

impl MakefileWriter for NdkMakefileWriter {
    fn makefile(&mut self) -> &mut Makefile {
        &mut self.makefile
    }
}

// =============================================================================
// Target Driver
// =============================================================================

/// Writes a target through `writer`: header, per-configuration flags, then
/// the module rule via `writer.write_android_ndk_module_rule` for linkable
/// targets.
pub fn write_target<W>(writer: &mut W, target: &TargetSpec, configs: &BuildConfigs) -> Result<(), GenerateError>
where
    W: MakefileWriter + ?Sized,
{
    let makefile = writer.makefile();
    makefile.write_ln("# This file is generated by gypfix; do not edit.");
    makefile.write_ln("");
    makefile.write_ln("TOOLSET := target");
    makefile.write_ln(&format!("TARGET := {}", target.target_name));
    makefile.write_ln("");

    for (name, settings) in configs {
        makefile.write_ln(&format!("### Rules for configuration {}", name));
        makefile.write_list(&settings.defines, &format!("DEFS_{}", name), "-D", quote_if_necessary);
        makefile.write_list(&settings.cflags, &format!("CFLAGS_{}", name), "", quote_if_necessary);
        makefile.write_list(&settings.include_dirs, &format!("INCS_{}", name), "-I", quote_if_necessary);
    }

    if !target.target_type.is_linkable() {
        return Ok(());
    }
    writer.write_android_ndk_module_rule(&ModuleRule::for_target(target), &PlainLists)
}

/// Source extensions ndk-build compiles.
const COMPILABLE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "s", "S", "m", "mm"];

/// C++ extensions considered for `LOCAL_CPP_EXTENSION`, in tie-break order.
const CPP_EXTENSIONS: &[&str] = &[".cc", ".cpp", ".cxx"];

fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map(|(_, ext)| ext)
}

fn is_compilable(path: &str) -> bool {
    extension(path).is_some_and(|ext| COMPILABLE_EXTENSIONS.contains(&ext))
}

/// Picks the most common C++ extension among `sources` (`.cc` by default).
fn cpp_extension(sources: &[String]) -> &'static str {
    let mut best = CPP_EXTENSIONS[0];
    let mut best_count = 0;
    for candidate in CPP_EXTENSIONS {
        let count = sources.iter().filter(|s| s.ends_with(candidate)).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Module names of the deps named `{prefix}{module}{suffix}`.
fn deps_to_modules(deps: &[String], prefix: &str, suffix: &str) -> Vec<String> {
    deps.iter()
        .filter_map(|dep| {
            let file_name = dep.rsplit('/').next().unwrap_or(dep);
            file_name.strip_prefix(prefix)?.strip_suffix(suffix)
        })
        .filter(|module| !module.is_empty())
        .map(str::to_string)
        .collect()
}

/// Writes the ndk-build module rule for one target.
pub fn write_module_rule(makefile: &mut Makefile, rule: &ModuleRule<'_>, lists: &dyn ListWriter) {
    let include = match rule.target_type {
        TargetType::Executable => "include $(BUILD_EXECUTABLE)",
        TargetType::SharedLibrary => "include $(BUILD_SHARED_LIBRARY)",
        TargetType::StaticLibrary => "include $(BUILD_STATIC_LIBRARY)",
        TargetType::None => return,
    };

    makefile.write_ln("# Variable definitions for Android applications");
    makefile.write_ln("include $(CLEAR_VARS)");
    makefile.write_ln(&format!("LOCAL_MODULE := {}", rule.module_name));
    makefile.write_ln(
        "LOCAL_CFLAGS := $(CFLAGS_$(BUILDTYPE)) $(DEFS_$(BUILDTYPE)) \
         $(CFLAGS_C_$(BUILDTYPE)) $(INCS_$(BUILDTYPE))",
    );
    makefile.write_ln("LOCAL_CPPFLAGS := $(CFLAGS_CC_$(BUILDTYPE))");
    makefile.write_ln("LOCAL_C_INCLUDES :=");
    makefile.write_ln("LOCAL_LDLIBS := $(LDFLAGS_$(BUILDTYPE)) $(LIBS)");
    makefile.write_ln(&format!("LOCAL_CPP_EXTENSION := {}", cpp_extension(rule.all_sources)));
    makefile.write_ln("");

    let sources: Vec<String> = rule
        .all_sources
        .iter()
        .filter(|s| is_compilable(s))
        .cloned()
        .collect();
    lists.write_list(makefile, &sources, "LOCAL_SRC_FILES", "", quote_if_necessary);

    lists.write_list(
        makefile,
        &deps_to_modules(rule.link_deps, "lib", ".so"),
        SHARED_LIBRARIES_VAR,
        "",
        quote_if_necessary,
    );
    lists.write_list(
        makefile,
        &deps_to_modules(rule.link_deps, "lib", ".a"),
        STATIC_LIBRARIES_VAR,
        "",
        quote_if_necessary,
    );

    makefile.write_ln(include);
    makefile.write_ln("");
}
