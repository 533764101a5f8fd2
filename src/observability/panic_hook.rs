//! Uncaught panic logging.
//!
//! A panic that nothing catches ends up here on whichever thread raised it.
//! The hook records it as a critical event and returns; unwinding and process
//! termination carry on as they would without it.
//!
//! Code that catches panics itself marks the region with [`catching`]. Inside
//! it the hook stays quiet and keeps the details for [`take_caught`].

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::panic::{Location, PanicHookInfo};

thread_local! {
    static CATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_CAUGHT: RefCell<Option<CaughtPanic>> = const { RefCell::new(None) };
}

/// Details of a panic raised inside a [`catching`] region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaughtPanic {
    pub location: String,
    pub backtrace: Option<String>,
}

/// Marks the current thread as catching panics until dropped.
#[derive(Debug)]
pub struct CatchGuard {
    _not_send: std::marker::PhantomData<*const ()>,
}

/// Enter a region whose panics are caught by the caller.
///
/// Regions nest. The guard must be dropped on the thread that created it.
pub fn catching() -> CatchGuard {
    CATCH_DEPTH.with(|depth| depth.set(depth.get() + 1));
    CatchGuard {
        _not_send: std::marker::PhantomData,
    }
}

impl Drop for CatchGuard {
    fn drop(&mut self) {
        CATCH_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

fn is_catching() -> bool {
    CATCH_DEPTH.try_with(|depth| depth.get() > 0).unwrap_or(false)
}

/// Details of the last panic caught on this thread, if the hook saw one.
pub fn take_caught() -> Option<CaughtPanic> {
    LAST_CAUGHT.try_with(|last| last.borrow_mut().take()).ok().flatten()
}

/// Replace the process panic hook with [`log_panic`].
///
/// Installing again replaces the previous hook.
pub fn install() {
    std::panic::set_hook(Box::new(log_panic));
}

/// Panic hook body.
pub fn log_panic(info: &PanicHookInfo<'_>) {
    if is_catching() {
        record_caught(info.location());
        return;
    }
    let message = payload_message(info.payload());
    log_uncaught_panic(message, info.location());
}

fn record_caught(location: Option<&Location<'_>>) {
    let backtrace = Backtrace::capture();
    let caught = CaughtPanic {
        location: location.map(ToString::to_string).unwrap_or_default(),
        backtrace: (backtrace.status() == BacktraceStatus::Captured).then(|| backtrace.to_string()),
    };
    let _ = LAST_CAUGHT.try_with(|last| *last.borrow_mut() = Some(caught));
}

/// Log an uncaught panic at critical severity.
pub fn log_uncaught_panic(message: &str, location: Option<&Location<'_>>) {
    let thread = std::thread::current();
    let thread_name = thread.name().unwrap_or("<unnamed>");
    let location = location.map(ToString::to_string).unwrap_or_default();

    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        tracing::error!(
            severity = "critical",
            panic.message = %message,
            panic.location = %location,
            thread = %thread_name,
            backtrace = %backtrace,
            "Uncaught exception"
        );
    } else {
        tracing::error!(
            severity = "critical",
            panic.message = %message,
            panic.location = %location,
            thread = %thread_name,
            "Uncaught exception"
        );
    }
}

/// Best-effort text of a panic payload.
pub fn payload_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "Box<dyn Any>"
    }
}
