//! Namespace relative log patches.
//!
//! Tests usually care about the events of one module. Rather than spelling
//! out the full target each time, make a patcher for the crate (or parent
//! module) once and patch relative paths from it.

use crate::testing::capture::LogCapture;

/// A capture substitution aimed at one target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPatch {
    target: String,
}

impl LogPatch {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Swap in a capturing subscriber for the patched target on this thread.
    pub fn start(&self) -> LogCapture {
        LogCapture::for_target(self.target.clone())
    }
}

/// Create a namespace relative patcher.
///
/// `relative_patch_maker("my_crate")("http::middleware")` patches
/// `my_crate::http::middleware`.
pub fn relative_patch_maker(namespace: impl Into<String>) -> impl Fn(&str) -> LogPatch {
    let namespace = namespace.into();
    move |relative: &str| LogPatch::new(format!("{namespace}::{relative}"))
}
