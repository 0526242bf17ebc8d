//! Deferred computations
//!
//! A [`Task`] describes a computation that will eventually resolve to a
//! [`Value`] or reject with one. Nothing happens when a task is built or
//! combined. Work only starts when [`Task::run`] is called, and every call
//! starts a fresh, independent execution: there is no shared memoized result.
//!
//! # Examples
//!
//! ```
//! use liftfold::{Task, Value};
//!
//! # tokio_test::block_on(async {
//! let task = Task::of(5).map(|v| Value::from(v.as_int().unwrap() * 2));
//! assert_eq!(task.run().await, Ok(Value::from(10)));
//!
//! let failed = Task::rejected("boom").map(|v| v);
//! assert_eq!(failed.run().await, Err(Value::from("boom")));
//! # });
//! ```
//!
//! ## Callback-driven computations
//!
//! ```
//! use liftfold::{Task, Value};
//!
//! # tokio_test::block_on(async {
//! let task = Task::new(|resolver| {
//!     std::thread::spawn(move || resolver.resolve("donut"));
//! });
//! assert_eq!(task.run().await, Ok(Value::from("donut")));
//! # });
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt};

use crate::applicative::{Applicative, Chain};
use crate::value::Value;

/// The settled state of one task execution.
pub type Settled = Result<Value, Value>;

/// Function type for Task internals
type RunFn = Arc<dyn Fn() -> BoxFuture<'static, Settled> + Send + Sync>;

/// A lazily executed, re-runnable computation.
#[derive(Clone)]
pub struct Task {
    run_fn: RunFn,
}

// Manual Debug implementation since the run function is not Debug
impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("run_fn", &"<function>")
            .finish()
    }
}

/// Tasks are equal only when they share the same computation.
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.run_fn, &other.run_fn)
    }
}

impl Task {
    fn from_run<F>(run: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Settled> + Send + Sync + 'static,
    {
        Task {
            run_fn: Arc::new(run),
        }
    }

    /// A task that resolves immediately with `value`.
    pub fn of(value: impl Into<Value>) -> Self {
        let value = value.into();
        Task::from_run(move || futures::future::ready(Ok(value.clone())).boxed())
    }

    /// A task that rejects immediately with `reason`.
    pub fn rejected(reason: impl Into<Value>) -> Self {
        let reason = reason.into();
        Task::from_run(move || futures::future::ready(Err(reason.clone())).boxed())
    }

    /// Lift an outcome into a task that settles the same way.
    ///
    /// ```
    /// use liftfold::{Task, Value};
    ///
    /// # tokio_test::block_on(async {
    /// assert_eq!(Task::from_result(Ok(1.into())).run().await, Ok(Value::from(1)));
    /// assert_eq!(Task::from_result(Err(1.into())).run().await, Err(Value::from(1)));
    /// # });
    /// ```
    pub fn from_result(result: Settled) -> Self {
        match result {
            Ok(value) => Task::of(value),
            Err(reason) => Task::rejected(reason),
        }
    }

    /// A task that calls `f` each time it runs.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Settled + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Task::from_run(move || {
            let f = Arc::clone(&f);
            async move { f() }.boxed()
        })
    }

    /// A task that builds a fresh future from `f` each time it runs.
    ///
    /// ```
    /// use liftfold::{Task, Value};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::from_async(|| async { Ok(Value::from("shellacing")) });
    /// assert_eq!(task.run().await, Ok(Value::from("shellacing")));
    /// # });
    /// ```
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Settled> + Send + 'static,
    {
        Task::from_run(move || f().boxed())
    }

    /// A task driven by a callback.
    ///
    /// `computation` receives a [`Resolver`] and settles the task by calling
    /// [`Resolver::resolve`] or [`Resolver::reject`], possibly later and from
    /// another thread. A resolver dropped without settling rejects the run.
    pub fn new<F>(computation: F) -> Self
    where
        F: Fn(Resolver) + Send + Sync + 'static,
    {
        let computation = Arc::new(computation);
        Task::from_run(move || {
            let computation = Arc::clone(&computation);
            async move {
                let (tx, rx) = oneshot::channel();
                computation(Resolver { tx });
                rx.await.unwrap_or_else(|_| {
                    Err(Value::from(
                        "deferred computation dropped its resolver without settling",
                    ))
                })
            }
            .boxed()
        })
    }

    /// Adopt a future that may already be in flight.
    ///
    /// Unlike the other constructors the future is driven at most once;
    /// every run of the task observes its single outcome.
    ///
    /// ```
    /// use liftfold::{Task, Value};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::from_future(async { Err(Value::from("octopus")) });
    /// assert_eq!(task.run().await, Err(Value::from("octopus")));
    /// assert_eq!(task.run().await, Err(Value::from("octopus")));
    /// # });
    /// ```
    pub fn from_future<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Settled> + Send + 'static,
    {
        let shared = future.boxed().shared();
        Task::from_run(move || shared.clone().boxed())
    }

    /// Start an independent execution of this task.
    ///
    /// This is the bridge from a task to a standard future.
    pub fn run(&self) -> BoxFuture<'static, Settled> {
        (self.run_fn)()
    }

    /// Transform the resolved value.
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Task::from_run(move || {
            let f = Arc::clone(&f);
            let inner = self.run();
            async move { inner.await.map(|v| f(v)) }.boxed()
        })
    }

    /// Transform the rejection reason.
    pub fn map_err<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Task::from_run(move || {
            let f = Arc::clone(&f);
            let inner = self.run();
            async move { inner.await.map_err(|e| f(e)) }.boxed()
        })
    }

    /// Run `self`, then the task `f` builds from its value.
    pub fn and_then<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Task + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Task::from_run(move || {
            let f = Arc::clone(&f);
            let inner = self.run();
            async move {
                let value = inner.await?;
                f(value).run().await
            }
            .boxed()
        })
    }

    /// Apply the function this task resolves to with the value of `values`.
    ///
    /// `self` runs to completion first; `values` is only started once `self`
    /// has resolved, and never if it rejects.
    pub fn apply(self, values: Task) -> Self {
        Task::from_run(move || {
            let functions = self.run();
            let values = values.clone();
            async move {
                let f = functions.await?;
                let x = values.run().await?;
                Ok(f.call(x))
            }
            .boxed()
        })
    }

    /// Run every execution of this task inside `span`.
    ///
    /// ```
    /// use liftfold::{Task, Value};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::of(42).instrument(tracing::info_span!("answer"));
    /// assert_eq!(task.run().await, Ok(Value::from(42)));
    /// # });
    /// ```
    pub fn instrument(self, span: tracing::Span) -> Self {
        use tracing::Instrument as _;

        Task::from_run(move || self.run().instrument(span.clone()).boxed())
    }
}

impl Applicative for Task {
    fn unit(value: Value) -> Self {
        Task::of(value)
    }

    fn fmap<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.map(f)
    }

    fn ap(self, values: Self) -> Self {
        self.apply(values)
    }
}

impl Chain for Task {
    fn chain<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Self + Send + Sync + 'static,
    {
        self.and_then(f)
    }
}

/// Settles one execution of a callback-driven [`Task`].
#[derive(Debug)]
pub struct Resolver {
    tx: oneshot::Sender<Settled>,
}

impl Resolver {
    /// Resolve the execution with `value`.
    pub fn resolve(self, value: impl Into<Value>) {
        // The receiver is gone only if the run was dropped; nobody is listening.
        let _ = self.tx.send(Ok(value.into()));
    }

    /// Reject the execution with `reason`.
    pub fn reject(self, reason: impl Into<Value>) {
        let _ = self.tx.send(Err(reason.into()));
    }

    /// Settle the execution with an outcome.
    pub fn settle(self, outcome: Settled) {
        let _ = self.tx.send(outcome);
    }
}
