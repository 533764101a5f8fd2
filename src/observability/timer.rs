//! Timing information for calls.
//!
//! Wraps a callable and logs how long it took once it returns. A panic in
//! the callable propagates and nothing is logged; for `Result` callables
//! [`Timed::try_call`] only logs successful calls.

use std::fmt::Debug;
use std::future::Future;
use std::time::Instant;

use tracing::Level;

use crate::observability::log_at;

/// Logs elapsed wall-clock time of calls.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    level: Level,
    details: bool,
}

impl Default for Timer {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            details: false,
        }
    }
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Include call arguments in the timing event.
    pub fn details(mut self, details: bool) -> Self {
        self.details = details;
        self
    }

    /// Wrap `f` so every call through [`Timed`] is timed.
    pub fn wrap<F>(self, name: &'static str, f: F) -> Timed<F> {
        Timed {
            name,
            inner: f,
            timer: self,
        }
    }

    /// Time a single block.
    pub fn time<R>(&self, name: &str, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = f();
        self.record(name, start, None);
        result
    }

    /// Time a future until it resolves.
    pub async fn time_async<Fut: Future>(&self, name: &str, fut: Fut) -> Fut::Output {
        let start = Instant::now();
        let output = fut.await;
        self.record(name, start, None);
        output
    }

    fn record(&self, function: &str, start: Instant, fn_args: Option<String>) {
        let seconds = start.elapsed().as_secs_f64();
        match fn_args {
            Some(fn_args) => log_at!(
                self.level,
                function = %function,
                seconds,
                fn_args = %fn_args,
                "timing information"
            ),
            None => log_at!(self.level, function = %function, seconds, "timing information"),
        }
    }
}

/// A callable wrapped by a [`Timer`].
///
/// Arguments are passed as a single value; use a tuple for several.
#[derive(Debug, Clone)]
pub struct Timed<F> {
    name: &'static str,
    inner: F,
    timer: Timer,
}

impl<F> Timed<F> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call<A, R>(&self, args: A) -> R
    where
        F: Fn(A) -> R,
        A: Debug,
    {
        let fn_args = self.timer.details.then(|| format!("{args:?}"));
        let start = Instant::now();
        let result = (self.inner)(args);
        self.timer.record(self.name, start, fn_args);
        result
    }

    /// Like [`Timed::call`], but an `Err` is returned untouched and not timed.
    pub fn try_call<A, T, E>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Result<T, E>,
        A: Debug,
    {
        let fn_args = self.timer.details.then(|| format!("{args:?}"));
        let start = Instant::now();
        let value = (self.inner)(args)?;
        self.timer.record(self.name, start, fn_args);
        Ok(value)
    }
}

/// Wrap `f` with a default [`Timer`].
pub fn timed<F>(name: &'static str, f: F) -> Timed<F> {
    Timer::default().wrap(name, f)
}
