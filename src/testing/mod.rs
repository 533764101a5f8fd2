//! Test support.
//!
//! - capture.rs: record tracing events on the current thread
//! - patch.rs: namespace relative captures

pub mod capture;
pub mod patch;

pub use capture::{capture_logs, CaptureLayer, CapturedEvent, LogCapture, SharedBuffer};
pub use patch::{relative_patch_maker, LogPatch};
