//! Running deferred computations with listeners
//!
//! A [`RunConfig`] pairs a resolved handler with a rejected handler. Passing
//! one to [`Task::listen`] runs the task once and hands the settled value to
//! the matching handler. A rejection is never silently dropped: unless the
//! caller supplies a handler, the default one logs the reason at `error`
//! level and raises [`UnhandledRejection`].
//!
//! # Examples
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use liftfold::{default_run_config, Task, Value};
//!
//! let seen = Arc::new(Mutex::new(None));
//! let sink = Arc::clone(&seen);
//!
//! Task::of(6).listen_blocking(default_run_config(move |v| {
//!     *sink.lock().unwrap() = Some(v);
//! }));
//! assert_eq!(*seen.lock().unwrap(), Some(Value::from(6)));
//! ```

use std::fmt;

use crate::container::Container;
use crate::error::{raise, LiftError, UnhandledRejection};
use crate::task::{Settled, Task};
use crate::value::Value;

type Handler = Box<dyn FnOnce(Value) + Send>;

/// Listeners for the two ways a deferred computation can settle.
pub struct RunConfig {
    on_resolved: Handler,
    on_rejected: Handler,
    unwrap_outcome: bool,
}

impl RunConfig {
    /// Listen for the resolved value; rejections are raised as
    /// [`UnhandledRejection`].
    pub fn new<F>(on_resolved: F) -> Self
    where
        F: FnOnce(Value) + Send + 'static,
    {
        Self {
            on_resolved: Box::new(on_resolved),
            on_rejected: Box::new(raise_unhandled),
            unwrap_outcome: false,
        }
    }

    /// Replace the rejected handler.
    pub fn on_rejected<F>(mut self, on_rejected: F) -> Self
    where
        F: FnOnce(Value) + Send + 'static,
    {
        self.on_rejected = Box::new(on_rejected);
        self
    }

    /// Whether the resolved payload is unwrapped as an outcome before it is
    /// handed on.
    pub fn unwraps_outcome(&self) -> bool {
        self.unwrap_outcome
    }

    /// Dispatch a settled value to the matching handler.
    ///
    /// # Panics
    ///
    /// With the default rejected handler, panics with [`UnhandledRejection`]
    /// on a rejection. A result-unwrapping configuration panics with
    /// [`LiftError::NotAnOutcome`] when the resolved payload is not an
    /// outcome container.
    #[track_caller]
    pub fn settle(self, settled: Settled) {
        match settled {
            Ok(value) if self.unwrap_outcome => match value.into_container() {
                Ok(Container::Outcome(Ok(inner))) => (self.on_resolved)(inner),
                Ok(Container::Outcome(Err(failure))) => (self.on_rejected)(failure),
                Ok(other) => raise(LiftError::NotAnOutcome(kind_name(&other))),
                Err(plain) => raise(LiftError::NotAnOutcome(plain.type_name())),
            },
            Ok(value) => (self.on_resolved)(value),
            Err(reason) => (self.on_rejected)(reason),
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("unwrap_outcome", &self.unwrap_outcome)
            .finish_non_exhaustive()
    }
}

/// Listen for the resolved value of a task. Rejections are raised.
pub fn default_run_config<F>(on_resolved: F) -> RunConfig
where
    F: FnOnce(Value) + Send + 'static,
{
    RunConfig::new(on_resolved)
}

/// Listen for a task that resolves to an outcome.
///
/// `Ok(value)` hands `value` to `on_resolved`. Both `Err(failure)` and a
/// rejection of the task itself go to the rejected handler, which raises
/// unless replaced.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use liftfold::{default_run_to_result_config, Container, Task, Value};
///
/// let failures = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&failures);
///
/// let config = default_run_to_result_config(|_| {})
///     .on_rejected(move |reason| sink.lock().unwrap().push(reason));
/// Task::of(Container::err("bad input")).listen_blocking(config);
///
/// assert_eq!(*failures.lock().unwrap(), vec![Value::from("bad input")]);
/// ```
pub fn default_run_to_result_config<F>(on_resolved: F) -> RunConfig
where
    F: FnOnce(Value) + Send + 'static,
{
    RunConfig {
        unwrap_outcome: true,
        ..RunConfig::new(on_resolved)
    }
}

impl Task {
    /// Run the task once and dispatch its settled value to `config`.
    pub async fn listen(&self, config: RunConfig) {
        let settled = self.run().await;
        tracing::trace!(resolved = settled.is_ok(), "task settled");
        config.settle(settled);
    }

    /// Drive the task to completion on the current thread, then dispatch
    /// its settled value to `config`.
    ///
    /// Tasks that depend on a specific async runtime (for example timers from
    /// `tokio`) must be driven with [`Task::listen`] inside that runtime.
    pub fn listen_blocking(&self, config: RunConfig) {
        futures::executor::block_on(self.listen(config));
    }
}

fn raise_unhandled(reason: Value) {
    let err = UnhandledRejection::new(reason);
    tracing::error!(error = %err, "deferred computation rejected with no handler");
    panic!("{err}");
}

fn kind_name(container: &Container) -> &'static str {
    match container {
        Container::Outcome(_) => "outcome container",
        Container::Presence(_) => "presence container",
        Container::Deferred(_) => "deferred container",
        Container::Sequence(_) => "sequence container",
    }
}
