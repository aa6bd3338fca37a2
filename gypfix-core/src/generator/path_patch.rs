//! Keeps parameter tokens out of path normalization.
//!
//! Some action arguments (js2c variant names, build-v8 architectures) look
//! like relative paths to the project writer and would otherwise come out as
//! `..\..\CORE`.

use super::msvs::PathFixer;

/// Tokens returned unchanged. Matching is exact.
pub const NON_PATH_TOKENS: &[&str] = &[
    // js2c
    "CORE",
    "EXPERIMENTAL",
    "off",
    "EXTRAS",
    "EXPERIMENTAL_EXTRAS",
    // build-v8
    "ia32",
    "x64",
];

/// Returns true if `token` is exempt from path fixup.
pub fn is_non_path_token(token: &str) -> bool {
    NON_PATH_TOKENS.contains(&token)
}

/// Wraps a `PathFixer`, passing `NON_PATH_TOKENS` through untouched.
#[derive(Debug, Clone, Default)]
pub struct KeepNonPathTokens<F> {
    inner: F,
}

impl<F: PathFixer> KeepNonPathTokens<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: PathFixer> PathFixer for KeepNonPathTokens<F> {
    fn fix_path(&self, path: &str) -> String {
        if is_non_path_token(path) {
            return path.to_string();
        }
        self.inner.fix_path(path)
    }
}
