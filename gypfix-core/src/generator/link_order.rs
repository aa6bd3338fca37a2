//! Link-order fix for manually built static libraries.
//!
//! ndk-build passes libraries from `ldflags`/`libraries` to the linker after
//! system libraries such as `c++_static`, so symbols those system libraries
//! provide cannot be resolved. ndk-build also drops entries of
//! `LOCAL_STATIC_LIBRARIES` that no Makefile defines. `LinkOrderPatch`
//! therefore declares each configuration's `user_libraries` as prebuilt
//! static modules and appends them to `LOCAL_STATIC_LIBRARIES`, after the
//! regular dependencies.
//!
//! The per-target configurations are captured while `write` runs and are
//! released by a guard on every exit path.

use std::ops::{Deref, DerefMut};

use tracing::debug;

use super::error::GenerateError;
use super::makefile::{
    write_target, ListWriter, Makefile, MakefileWriter, ModuleRule, Quoter, STATIC_LIBRARIES_VAR,
};
use super::spec::{BuildConfigs, TargetSpec};

/// Configuration-scoped accumulator of declared user libraries.
pub const USER_LIBRARIES_VAR: &str = "USER_STATIC_LIBRARIES_${BUILDTYPE}";

/// Reference to `USER_LIBRARIES_VAR` appended to the static libraries list.
pub const USER_LIBRARIES_REFERENCE: &str = "${USER_STATIC_LIBRARIES_${BUILDTYPE}}";

/// Appends user libraries to the link line of the wrapped writer.
#[derive(Debug, Default)]
pub struct LinkOrderPatch<W> {
    inner: W,
    configs: Option<BuildConfigs>,
}

impl<W: MakefileWriter> LinkOrderPatch<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            configs: None,
        }
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// True while a target write holds its configurations.
    pub fn has_captured_configs(&self) -> bool {
        self.configs.is_some()
    }
}

/// Holds the patch while its configurations are captured; clears them on drop.
struct CapturedConfigs<'a, W> {
    patch: &'a mut LinkOrderPatch<W>,
}

impl<'a, W> CapturedConfigs<'a, W> {
    fn capture(patch: &'a mut LinkOrderPatch<W>, configs: &BuildConfigs) -> Result<Self, GenerateError> {
        if patch.configs.is_some() {
            return Err(GenerateError::ConfigsAlreadyCaptured);
        }
        patch.configs = Some(configs.clone());
        Ok(Self { patch })
    }
}

impl<W> Deref for CapturedConfigs<'_, W> {
    type Target = LinkOrderPatch<W>;

    fn deref(&self) -> &Self::Target {
        self.patch
    }
}

impl<W> DerefMut for CapturedConfigs<'_, W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.patch
    }
}

impl<W> Drop for CapturedConfigs<'_, W> {
    fn drop(&mut self) {
        self.patch.configs = None;
    }
}

impl<W: MakefileWriter> MakefileWriter for LinkOrderPatch<W> {
    fn makefile(&mut self) -> &mut Makefile {
        self.inner.makefile()
    }

    fn write(&mut self, target: &TargetSpec, configs: &BuildConfigs) -> Result<(), GenerateError> {
        let mut scope = CapturedConfigs::capture(self, configs)?;
        debug!(target = %target.target_name, spec = ?target, "Writing Makefile target");
        write_target(&mut *scope, target, configs)
    }

    fn write_android_ndk_module_rule(
        &mut self,
        rule: &ModuleRule<'_>,
        lists: &dyn ListWriter,
    ) -> Result<(), GenerateError> {
        let configs = self.configs.as_ref().ok_or(GenerateError::ConfigsNotCaptured)?;

        let makefile = self.inner.makefile();
        let mut declared = false;
        for (config, settings) in configs {
            let Some(libraries) = settings.user_libraries() else {
                continue;
            };
            declare_user_libraries(makefile, config, libraries);
            declared = true;
        }

        if declared {
            self.inner
                .write_android_ndk_module_rule(rule, &AppendStaticLibraries::new(lists))
        } else {
            self.inner.write_android_ndk_module_rule(rule, lists)
        }
    }
}

/// Emits prebuilt module declarations for `libraries`, guarded by `config`.
fn declare_user_libraries(makefile: &mut Makefile, config: &str, libraries: &[String]) {
    makefile.write_ln(&format!("ifeq (${{BUILDTYPE}}, {})", config));
    for library in libraries {
        makefile.write_ln("include $(CLEAR_VARS)");
        makefile.write_ln(&format!("LOCAL_MODULE := {}", library));
        makefile.write_ln(&format!("LOCAL_SRC_FILES := {}", library));
        makefile.write_ln("include $(PREBUILT_STATIC_LIBRARY)");
        makefile.write_ln(&format!("{} += {}", USER_LIBRARIES_VAR, library));
    }
    makefile.write_ln("endif");
}

/// List strategy appending `USER_LIBRARIES_REFERENCE` to static library lists.
pub struct AppendStaticLibraries<'a> {
    inner: &'a dyn ListWriter,
}

impl<'a> AppendStaticLibraries<'a> {
    pub fn new(inner: &'a dyn ListWriter) -> Self {
        Self { inner }
    }
}

impl ListWriter for AppendStaticLibraries<'_> {
    fn write_list(
        &self,
        makefile: &mut Makefile,
        values: &[String],
        variable: &str,
        prefix: &str,
        quoter: Quoter,
    ) {
        if variable != STATIC_LIBRARIES_VAR {
            return self.inner.write_list(makefile, values, variable, prefix, quoter);
        }
        let mut values = values.to_vec();
        values.push(USER_LIBRARIES_REFERENCE.to_string());
        self.inner.write_list(makefile, &values, variable, prefix, quoter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::makefile::{quote_if_necessary, NdkMakefileWriter, PlainLists};
    use crate::generator::spec::{ConfigSettings, TargetType};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn static_target() -> TargetSpec {
        TargetSpec {
            target_name: "libadblockplus".to_string(),
            target_type: TargetType::StaticLibrary,
            sources: strings(&["src/JsEngine.cpp"]),
            link_deps: strings(&["out/libv8_base.a"]),
            ..Default::default()
        }
    }

    fn release_and_debug() -> BuildConfigs {
        let mut configs = BuildConfigs::new();
        configs.insert(
            "release".to_string(),
            ConfigSettings {
                user_libraries: Some(strings(&["foo", "bar"])),
                ..Default::default()
            },
        );
        configs.insert("debug".to_string(), ConfigSettings::default());
        configs
    }

    /// Records how often the delegate is reached.
    #[derive(Default)]
    struct CountingWriter {
        makefile: Makefile,
        makefile_calls: usize,
        rule_calls: usize,
        fail_rule: bool,
    }

    impl MakefileWriter for CountingWriter {
        fn makefile(&mut self) -> &mut Makefile {
            self.makefile_calls += 1;
            &mut self.makefile
        }

        fn write_android_ndk_module_rule(
            &mut self,
            _rule: &ModuleRule<'_>,
            _lists: &dyn ListWriter,
        ) -> Result<(), GenerateError> {
            self.rule_calls += 1;
            if self.fail_rule {
                return Err(GenerateError::Io(std::io::Error::other("disk full")));
            }
            Ok(())
        }
    }

    #[test]
    fn test_release_libraries_follow_regular_dependencies() {
        let mut patch = LinkOrderPatch::new(NdkMakefileWriter::new());
        patch.write(&static_target(), &release_and_debug()).unwrap();
        assert!(!patch.has_captured_configs());
        let text = patch.into_inner().into_makefile().into_string();

        let block = "ifeq (${BUILDTYPE}, release)\n\
                     include $(CLEAR_VARS)\n\
                     LOCAL_MODULE := foo\n\
                     LOCAL_SRC_FILES := foo\n\
                     include $(PREBUILT_STATIC_LIBRARY)\n\
                     USER_STATIC_LIBRARIES_${BUILDTYPE} += foo\n\
                     include $(CLEAR_VARS)\n\
                     LOCAL_MODULE := bar\n\
                     LOCAL_SRC_FILES := bar\n\
                     include $(PREBUILT_STATIC_LIBRARY)\n\
                     USER_STATIC_LIBRARIES_${BUILDTYPE} += bar\n\
                     endif\n";
        assert!(text.contains(block));
        assert!(!text.contains("ifeq (${BUILDTYPE}, debug)"));

        let module = text.find("LOCAL_MODULE := libadblockplus").unwrap();
        assert!(text.find(block).unwrap() < module);

        assert!(text.contains(
            "LOCAL_STATIC_LIBRARIES := \\\n\tv8_base \\\n\t${USER_STATIC_LIBRARIES_${BUILDTYPE}}\n\n"
        ));
        assert!(text.contains("LOCAL_SHARED_LIBRARIES :=\n\n"));
    }

    #[test]
    fn test_without_user_libraries_output_is_unchanged() {
        let mut configs = BuildConfigs::new();
        configs.insert(
            "debug".to_string(),
            ConfigSettings {
                user_libraries: Some(Vec::new()),
                ..Default::default()
            },
        );

        let mut plain = NdkMakefileWriter::new();
        plain.write(&static_target(), &configs).unwrap();

        let mut patch = LinkOrderPatch::new(NdkMakefileWriter::new());
        patch.write(&static_target(), &configs).unwrap();

        assert_eq!(patch.into_inner().into_makefile(), plain.into_makefile());
    }

    #[test]
    fn test_reentrant_write_aborts_before_delegate() {
        let mut patch = LinkOrderPatch::new(CountingWriter::default());
        patch.configs = Some(release_and_debug());

        let err = patch.write(&static_target(), &BuildConfigs::new()).unwrap_err();

        assert!(matches!(err, GenerateError::ConfigsAlreadyCaptured));
        assert_eq!(patch.inner().makefile_calls, 0);
        assert_eq!(patch.inner().rule_calls, 0);
        assert!(patch.inner().makefile.as_str().is_empty());
    }

    #[test]
    fn test_configs_released_when_delegate_fails() {
        let mut patch = LinkOrderPatch::new(CountingWriter {
            fail_rule: true,
            ..Default::default()
        });

        let err = patch.write(&static_target(), &release_and_debug()).unwrap_err();
        assert!(matches!(err, GenerateError::Io(_)));
        assert_eq!(patch.inner().rule_calls, 1);
        assert!(!patch.has_captured_configs());

        // A second target can be written after the failure.
        patch.inner.fail_rule = false;
        patch.write(&static_target(), &release_and_debug()).unwrap();
        assert_eq!(patch.inner().rule_calls, 2);
    }

    #[test]
    fn test_configs_released_when_delegate_panics() {
        struct PanickingWriter(Makefile);

        impl MakefileWriter for PanickingWriter {
            fn makefile(&mut self) -> &mut Makefile {
                &mut self.0
            }

            fn write_android_ndk_module_rule(
                &mut self,
                _rule: &ModuleRule<'_>,
                _lists: &dyn ListWriter,
            ) -> Result<(), GenerateError> {
                panic!("generator bug");
            }
        }

        let mut patch = LinkOrderPatch::new(PanickingWriter(Makefile::new()));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            patch.write(&static_target(), &release_and_debug())
        }));

        assert!(result.is_err());
        assert!(!patch.has_captured_configs());
    }

    #[test]
    fn test_actions_only_target_skips_module_rule() {
        let target = TargetSpec {
            target_name: "js2c".to_string(),
            ..Default::default()
        };
        let mut patch = LinkOrderPatch::new(CountingWriter::default());

        patch.write(&target, &release_and_debug()).unwrap();

        assert_eq!(patch.inner().rule_calls, 0);
        assert!(!patch.inner().makefile.as_str().contains("PREBUILT_STATIC_LIBRARY"));
        assert!(!patch.has_captured_configs());
    }

    #[test]
    fn test_module_rule_outside_write_is_rejected() {
        let target = static_target();
        let mut patch = LinkOrderPatch::new(NdkMakefileWriter::new());
        let err = patch
            .write_android_ndk_module_rule(&ModuleRule::for_target(&target), &PlainLists)
            .unwrap_err();
        assert!(matches!(err, GenerateError::ConfigsNotCaptured));
    }

    #[test]
    fn test_append_strategy_only_touches_static_libraries() {
        let strategy = AppendStaticLibraries::new(&PlainLists);
        let mut makefile = Makefile::new();

        strategy.write_list(&mut makefile, &strings(&["a"]), "LOCAL_SRC_FILES", "", quote_if_necessary);
        strategy.write_list(&mut makefile, &[], STATIC_LIBRARIES_VAR, "", quote_if_necessary);

        assert_eq!(
            makefile.as_str(),
            "LOCAL_SRC_FILES := \\\n\ta\n\n\
             LOCAL_STATIC_LIBRARIES := \\\n\t${USER_STATIC_LIBRARIES_${BUILDTYPE}}\n\n"
        );
    }
}
