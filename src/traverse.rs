//! Folding ordered collections of containers into one container
//!
//! # Core Concepts
//!
//! - **`traverse_reduce`**: left fold of a binary function over the values
//!   inside a sequence of containers, combining the effects as it goes.
//!   - `[Ok(a), Ok(b)]` → `Ok(combine(combine(initial, a), b))`
//!   - any failure, absence or rejection short-circuits to itself
//!   - sequences expand cartesianly at every step
//!
//! - **`traverse_reduce_while`**: the same fold with an early-stop policy.
//!   Items past the stopping point are never combined, and for deferred
//!   containers never run.
//!
//! # Examples
//!
//! ## Outcome
//!
//! ```
//! use liftfold::{traverse::traverse_reduce, Container, Value};
//!
//! fn merge(acc: Value, pair: Value) -> Value {
//!     let mut map = acc.as_map().cloned().unwrap_or_default();
//!     if let [k, v] = pair.as_list().unwrap() {
//!         map.insert(k.as_str().unwrap().to_string(), v.clone());
//!     }
//!     Value::Map(map)
//! }
//!
//! let result = traverse_reduce(
//!     merge,
//!     Container::ok(Value::map_of::<&str, Value, _>([])),
//!     [Container::ok(Value::pair("a", "a")), Container::ok(Value::pair("b", "b"))],
//! );
//! assert_eq!(result, Container::ok(Value::map_of([("a", "a"), ("b", "b")])));
//! ```
//!
//! ## Deferred
//!
//! ```
//! use liftfold::{traverse::traverse_reduce, Container, Value};
//!
//! # tokio_test::block_on(async {
//! let add = |a: Value, b: Value| Value::from(a.as_int().unwrap() + b.as_int().unwrap());
//! let total = traverse_reduce(add, Container::of(0), [Container::of(1), Container::of(2)]);
//!
//! let task = total.as_task().unwrap();
//! assert_eq!(task.run().await, Ok(Value::from(3)));
//! # });
//! ```

use std::fmt;
use std::sync::Arc;

use crate::container::{Combine, Container, Kind};
use crate::error::{raise, LiftError};
use crate::task::Task;
use crate::value::Value;

type Predicate = Arc<dyn Fn(&Value, &Container) -> bool + Send + Sync>;

/// Early-stop policy for [`traverse_reduce_while`].
///
/// Before each item is folded, the predicate sees the plain value
/// accumulated so far and the item's (not yet combined) container. When it
/// returns `false` the fold stops: the item is dropped, unless
/// `accumulate_after_predicate_fail` is set, in which case it is folded in
/// as the last one.
///
/// A bare closure converts into a policy with the flag unset.
///
/// # Examples
///
/// ```
/// use liftfold::ReducePolicy;
///
/// let policy = ReducePolicy::new(|acc, _item| acc.as_int() < Some(10))
///     .accumulate_after_predicate_fail(true);
/// assert!(policy.accumulates_after_predicate_fail());
/// ```
#[derive(Clone)]
pub struct ReducePolicy {
    predicate: Predicate,
    accumulate_after_predicate_fail: bool,
}

impl ReducePolicy {
    /// A policy that keeps folding while `predicate` holds.
    pub fn new<P>(predicate: P) -> Self
    where
        P: Fn(&Value, &Container) -> bool + Send + Sync + 'static,
    {
        ReducePolicy {
            predicate: Arc::new(predicate),
            accumulate_after_predicate_fail: false,
        }
    }

    /// Whether the item that fails the predicate is still folded in.
    pub fn accumulate_after_predicate_fail(mut self, accumulate: bool) -> Self {
        self.accumulate_after_predicate_fail = accumulate;
        self
    }

    /// Current value of the accumulate-after-fail flag.
    pub fn accumulates_after_predicate_fail(&self) -> bool {
        self.accumulate_after_predicate_fail
    }

    /// Evaluate the predicate.
    pub fn allows(&self, accumulated: &Value, item: &Container) -> bool {
        (self.predicate)(accumulated, item)
    }
}

impl<P> From<P> for ReducePolicy
where
    P: Fn(&Value, &Container) -> bool + Send + Sync + 'static,
{
    fn from(predicate: P) -> Self {
        ReducePolicy::new(predicate)
    }
}

impl fmt::Debug for ReducePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducePolicy")
            .field("predicate", &"<function>")
            .field(
                "accumulate_after_predicate_fail",
                &self.accumulate_after_predicate_fail,
            )
            .finish()
    }
}

/// Fold `items` into `initial` with `combine`, left to right.
///
/// Each step lifts `combine`, curried on the accumulator, and applies it
/// against the next item. An empty `items` returns `initial` unchanged.
///
/// For deferred containers the result is a single task whose execution runs
/// the items one after another, in order, and stops at the first rejection.
///
/// # Panics
///
/// Panics with [`LiftError::KindMismatch`] if any item is not of the same
/// kind as `initial`. The check happens before anything is combined.
///
/// # Examples
///
/// ```
/// use liftfold::{traverse::traverse_reduce, Container, Value};
///
/// let add = |a: Value, b: Value| Value::from(a.as_int().unwrap() + b.as_int().unwrap());
///
/// let sum = traverse_reduce(add, Container::just(0), [Container::just(1), Container::just(2)]);
/// assert_eq!(sum, Container::just(3));
///
/// let absent = traverse_reduce(add, Container::just(0), [Container::just(1), Container::nothing()]);
/// assert_eq!(absent, Container::nothing());
/// ```
#[track_caller]
pub fn traverse_reduce<F, I>(combine: F, initial: Container, items: I) -> Container
where
    F: Fn(Value, Value) -> Value + Send + Sync + 'static,
    I: IntoIterator<Item = Container>,
{
    reduce_with(Arc::new(combine), initial, items)
}

#[track_caller]
pub(crate) fn reduce_with<I>(combine: Combine, initial: Container, items: I) -> Container
where
    I: IntoIterator<Item = Container>,
{
    let items = homogeneous(&initial, items);
    tracing::debug!(kind = %initial.kind(), items = items.len(), "reducing containers");

    match initial {
        Container::Deferred(initial) => reduce_deferred(combine, initial, items),
        eager => items.into_iter().fold(eager, |acc, item| {
            acc.lift2_with(item, Arc::clone(&combine))
        }),
    }
}

/// One task that runs `initial`, then each item in order, carrying the
/// accumulator by value. Stops at the first rejection.
fn reduce_deferred(combine: Combine, initial: Task, items: Vec<Container>) -> Container {
    let items = Arc::new(items);
    Container::Deferred(Task::from_async(move || {
        let combine = Arc::clone(&combine);
        let initial = initial.clone();
        let items = Arc::clone(&items);
        async move {
            let mut acc = initial.run().await?;
            for item in items.iter() {
                let value = task_of(item).run().await?;
                acc = combine(acc, value);
            }
            Ok(acc)
        }
    }))
}

/// Fold `items` into `initial` with `combine` while `policy` allows it.
///
/// Behaves like [`traverse_reduce`] until the policy's predicate returns
/// `false` for some item *k*. The result is then the fold of items `[0, k)`,
/// or `[0, k]` when the policy accumulates after a failed predicate. Items
/// after the stopping point are never combined; for deferred containers they
/// are never run.
///
/// The predicate sees the plain accumulated value, so it is consulted as the
/// fold executes: immediately for eager containers, during the run for
/// deferred ones.
///
/// Unlike a fold that asks the predicate at every item regardless of state,
/// this one stops consulting it once the accumulator is failed, absent or
/// rejected: there is no plain value to hand it. The result is the same
/// either way, because the variant's short-circuit keeps the failure
/// unchanged through every later combine.
///
/// # Panics
///
/// Panics with [`LiftError::KindMismatch`] if any item is not of the same
/// kind as `initial`.
///
/// # Examples
///
/// ```
/// use liftfold::{traverse::traverse_reduce_while, Container, Value};
///
/// let add = |a: Value, b: Value| Value::from(a.as_int().unwrap() + b.as_int().unwrap());
/// let below_three = |acc: &Value, _: &Container| acc.as_int().unwrap() < 3;
///
/// let items = [Container::ok(1), Container::ok(2), Container::ok(3), Container::ok(4)];
/// let result = traverse_reduce_while(below_three, add, Container::ok(0), items);
/// assert_eq!(result, Container::ok(3));
/// ```
#[track_caller]
pub fn traverse_reduce_while<P, F, I>(policy: P, combine: F, initial: Container, items: I) -> Container
where
    P: Into<ReducePolicy>,
    F: Fn(Value, Value) -> Value + Send + Sync + 'static,
    I: IntoIterator<Item = Container>,
{
    let items = homogeneous(&initial, items);
    tracing::debug!(
        kind = %initial.kind(),
        items = items.len(),
        "reducing containers with early stop"
    );

    let fold = WhileFold {
        policy: policy.into(),
        combine: Arc::new(combine),
        kind: initial.kind(),
        items,
    };
    match initial {
        Container::Deferred(initial) => fold.run_deferred(initial),
        Container::Sequence(branches) => fold.run_branches(branches),
        single => fold.run_single(single),
    }
}

fn task_of(item: &Container) -> &Task {
    match item {
        Container::Deferred(task) => task,
        other => raise(LiftError::KindMismatch {
            left: Kind::Deferred,
            right: other.kind(),
        }),
    }
}

/// Collect the items, checking each against the accumulator's kind.
#[track_caller]
fn homogeneous<I>(initial: &Container, items: I) -> Vec<Container>
where
    I: IntoIterator<Item = Container>,
{
    let kind = initial.kind();
    items
        .into_iter()
        .inspect(|item| {
            if item.kind() != kind {
                raise(LiftError::KindMismatch {
                    left: kind,
                    right: item.kind(),
                });
            }
        })
        .collect()
}

struct WhileFold {
    policy: ReducePolicy,
    combine: Combine,
    kind: Kind,
    items: Vec<Container>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Fold,
    FoldAndStop,
    Stop,
}

impl WhileFold {
    fn decide(&self, accumulated: &Value, index: usize) -> Step {
        if self.policy.allows(accumulated, &self.items[index]) {
            return Step::Fold;
        }

        let skipped = self.items.len() - index - 1;
        if self.policy.accumulate_after_predicate_fail {
            tracing::debug!(index, skipped, "predicate failed, folding current item and stopping");
            Step::FoldAndStop
        } else {
            tracing::debug!(index, skipped, "predicate failed, stopping before current item");
            Step::Stop
        }
    }

    /// Outcome and presence hold at most one plain value at a time.
    fn run_single(&self, initial: Container) -> Container {
        let mut acc = initial;
        for index in 0..self.items.len() {
            let accumulated = match acc {
                Container::Outcome(Ok(value)) | Container::Presence(Some(value)) => value,
                failed => return failed,
            };

            let step = self.decide(&accumulated, index);
            if step == Step::Stop {
                return self.kind.unit(accumulated);
            }
            acc = self
                .kind
                .unit(accumulated)
                .lift2_with(self.items[index].clone(), Arc::clone(&self.combine));
            if step == Step::FoldAndStop {
                break;
            }
        }
        acc
    }

    /// Every branch of a sequence folds and stops on its own. Branches are
    /// finished depth first so the result keeps left-major order.
    fn run_branches(&self, initial: Vec<Value>) -> Container {
        let mut pending: Vec<(Value, usize)> = initial.into_iter().rev().map(|v| (v, 0)).collect();
        let mut finished = Vec::new();

        while let Some((accumulated, index)) = pending.pop() {
            if index == self.items.len() {
                finished.push(accumulated);
                continue;
            }

            let next_index = match self.decide(&accumulated, index) {
                Step::Fold => index + 1,
                Step::FoldAndStop => self.items.len(),
                Step::Stop => {
                    finished.push(accumulated);
                    continue;
                }
            };
            let expanded: Vec<(Value, usize)> = choices(&self.items[index])
                .iter()
                .map(|x| ((self.combine)(accumulated.clone(), x.clone()), next_index))
                .collect();
            pending.extend(expanded.into_iter().rev());
        }

        Container::Sequence(finished)
    }

    /// One task that awaits each item only after the predicate allowed it.
    /// Items past the stopping point are never run.
    fn run_deferred(self, initial: Task) -> Container {
        let fold = Arc::new(self);
        Container::Deferred(Task::from_async(move || {
            let fold = Arc::clone(&fold);
            let initial = initial.clone();
            async move {
                let mut acc = initial.run().await?;
                for (index, item) in fold.items.iter().enumerate() {
                    let step = fold.decide(&acc, index);
                    if step == Step::Stop {
                        break;
                    }
                    let value = task_of(item).run().await?;
                    acc = (fold.combine)(acc, value);
                    if step == Step::FoldAndStop {
                        break;
                    }
                }
                Ok(acc)
            }
        }))
    }
}

fn choices(item: &Container) -> &[Value] {
    match item {
        Container::Sequence(values) => values,
        other => raise(LiftError::KindMismatch {
            left: Kind::Sequence,
            right: other.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    use crate::task::Task;

    fn add(a: Value, b: Value) -> Value {
        Value::from(a.as_int().unwrap() + b.as_int().unwrap())
    }

    fn ints<C: Fn(i64) -> Container>(ctor: C, values: &[i64]) -> Vec<Container> {
        values.iter().copied().map(ctor).collect()
    }

    // traverse_reduce
    #[test]
    fn test_reduce_empty_returns_initial() {
        assert_eq!(traverse_reduce(add, Container::ok(5), []), Container::ok(5));
        assert_eq!(
            traverse_reduce(add, Container::nothing(), []),
            Container::nothing()
        );
    }

    #[test]
    fn test_reduce_outcome_folds_left() {
        let sub = |a: Value, b: Value| Value::from(a.as_int().unwrap() - b.as_int().unwrap());
        let result = traverse_reduce(sub, Container::ok(10), ints(Container::ok, &[1, 2, 3]));
        assert_eq!(result, Container::ok(4));
    }

    #[test]
    fn test_reduce_outcome_keeps_first_failure() {
        let items = vec![
            Container::ok(1),
            Container::err("first"),
            Container::err("second"),
        ];
        assert_eq!(
            traverse_reduce(add, Container::ok(0), items),
            Container::err("first")
        );
    }

    #[test]
    fn test_reduce_presence_absent_wins() {
        let items = vec![Container::just(1), Container::nothing(), Container::just(2)];
        assert_eq!(
            traverse_reduce(add, Container::just(0), items),
            Container::nothing()
        );
    }

    #[test]
    fn test_reduce_sequence_expands_each_step() {
        let items = vec![Container::sequence([1, 2]), Container::sequence([10, 20])];
        assert_eq!(
            traverse_reduce(add, Container::singleton(0), items),
            Container::sequence([11, 21, 12, 22])
        );
    }

    #[test]
    #[should_panic(expected = "cannot combine an outcome container with a presence container")]
    fn test_reduce_rejects_mixed_kinds() {
        traverse_reduce(add, Container::ok(0), [Container::ok(1), Container::just(2)]);
    }

    #[tokio::test]
    async fn test_reduce_deferred_stops_at_first_rejection() {
        let runs = Arc::new(AtomicUsize::new(0));
        let late = {
            let runs = Arc::clone(&runs);
            Container::Deferred(Task::from_fn(move || {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(Value::from(1))
            }))
        };

        let result = traverse_reduce(
            add,
            Container::of(0),
            [Container::of(1), Container::rejected("nope"), late],
        );
        let task = result.as_task().unwrap();

        assert_eq!(task.run().await, Err(Value::from("nope")));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    // traverse_reduce_while
    #[test]
    fn test_while_without_accumulate_drops_failing_item() {
        let policy = |acc: &Value, _: &Container| acc.as_int().unwrap() < 3;
        let result = traverse_reduce_while(
            policy,
            add,
            Container::ok(0),
            ints(Container::ok, &[1, 2, 3, 4]),
        );
        assert_eq!(result, Container::ok(3));
    }

    #[test]
    fn test_while_with_accumulate_keeps_failing_item() {
        let policy = ReducePolicy::new(|acc, _| acc.as_int().unwrap() < 3)
            .accumulate_after_predicate_fail(true);
        let result = traverse_reduce_while(
            policy,
            add,
            Container::ok(0),
            ints(Container::ok, &[1, 2, 3, 4]),
        );
        assert_eq!(result, Container::ok(6));
    }

    #[test]
    fn test_while_predicate_sees_item_container() {
        let policy = |_: &Value, item: &Container| *item != Container::just(3);
        let result = traverse_reduce_while(
            policy,
            add,
            Container::just(0),
            ints(Container::just, &[1, 2, 3, 4]),
        );
        assert_eq!(result, Container::just(3));
    }

    #[test]
    fn test_while_always_true_matches_reduce() {
        let items = ints(Container::ok, &[1, 2, 3]);
        assert_eq!(
            traverse_reduce_while(|_: &Value, _: &Container| true, add, Container::ok(0), items.clone()),
            traverse_reduce(add, Container::ok(0), items)
        );
    }

    #[test]
    fn test_while_never_consults_predicate_on_failed_accumulator() {
        let calls = Arc::new(AtomicUsize::new(0));
        let policy = {
            let calls = Arc::clone(&calls);
            move |_: &Value, _: &Container| {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            }
        };
        let result = traverse_reduce_while(
            policy,
            add,
            Container::err("early"),
            ints(Container::ok, &[1, 2]),
        );
        assert_eq!(result, Container::err("early"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_while_sequence_checks_each_branch() {
        // Branches that reach 10 stop, the others keep adding.
        let policy = |acc: &Value, _: &Container| acc.as_int().unwrap() < 10;
        let result = traverse_reduce_while(
            policy,
            add,
            Container::sequence([0, 10]),
            [Container::singleton(1), Container::singleton(2)],
        );
        assert_eq!(result, Container::sequence([3, 10]));
    }

    #[tokio::test]
    async fn test_while_deferred_never_runs_items_after_stop() {
        let runs = Arc::new(AtomicUsize::new(0));
        let item = |value: i64| {
            let runs = Arc::clone(&runs);
            Container::Deferred(Task::from_fn(move || {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(Value::from(value))
            }))
        };

        let policy = |acc: &Value, _: &Container| acc.as_int().unwrap() < 3;
        let result = traverse_reduce_while(
            policy,
            add,
            Container::of(0),
            [item(1), item(2), item(3), item(4)],
        );
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        let task = result.as_task().unwrap();
        assert_eq!(task.run().await, Ok(Value::from(3)));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_while_deferred_accumulates_stopping_item_only() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counted = |value: i64| {
            let runs = Arc::clone(&runs);
            Container::Deferred(Task::from_fn(move || {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(Value::from(value))
            }))
        };

        let policy = ReducePolicy::new(|acc: &Value, _: &Container| acc.as_int().unwrap() < 1)
            .accumulate_after_predicate_fail(true);
        let result = traverse_reduce_while(
            policy,
            add,
            Container::of(0),
            [Container::of(1), Container::of(2), counted(100)],
        );

        let task = result.as_task().unwrap();
        assert_eq!(task.run().await, Ok(Value::from(3)));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    const LONG: usize = 10_000;

    #[test]
    fn test_while_folds_long_eager_inputs() {
        let always = |_: &Value, _: &Container| true;
        let long = LONG as i64;

        let outcome = traverse_reduce_while(always, add, Container::ok(0), (0..LONG).map(|_| Container::ok(1)));
        assert_eq!(outcome, Container::ok(long));

        let presence = traverse_reduce_while(always, add, Container::just(0), (0..LONG).map(|_| Container::just(1)));
        assert_eq!(presence, Container::just(long));

        let sequence = traverse_reduce_while(
            always,
            add,
            Container::sequence([0, 1]),
            (0..LONG).map(|_| Container::singleton(1)),
        );
        assert_eq!(sequence, Container::sequence([long, long + 1]));
    }

    #[test]
    fn test_while_stops_late_in_long_eager_input() {
        let below = |acc: &Value, _: &Container| acc.as_int().unwrap() < 9_000;
        let result = traverse_reduce_while(below, add, Container::ok(0), (0..LONG).map(|_| Container::ok(1)));
        assert_eq!(result, Container::ok(9_000));
    }

    #[tokio::test]
    async fn test_reduce_folds_long_deferred_inputs() {
        let result = traverse_reduce(add, Container::of(0), (0..LONG).map(|_| Container::of(1)));
        let task = result.as_task().unwrap();
        assert_eq!(task.run().await, Ok(Value::from(LONG as i64)));
    }

    #[test]
    fn test_while_folds_long_deferred_inputs_off_runtime() {
        let below = |acc: &Value, _: &Container| acc.as_int().unwrap() < 9_000;
        let result = traverse_reduce_while(below, add, Container::of(0), (0..LONG).map(|_| Container::of(1)));
        let settled = crate::testing::run_blocking(result.as_task().unwrap());
        assert_eq!(settled, Ok(Value::from(9_000)));
    }

    #[test]
    #[traced_test]
    fn test_while_logs_early_stop() {
        let policy = |acc: &Value, _: &Container| acc.as_int().unwrap() < 1;
        traverse_reduce_while(policy, add, Container::ok(0), ints(Container::ok, &[1, 2]));

        assert!(logs_contain("predicate failed, stopping before current item"));
    }

    #[test]
    fn test_policy_from_closure_does_not_accumulate() {
        let policy: ReducePolicy = (|_: &Value, _: &Container| true).into();
        assert!(!policy.accumulates_after_predicate_fail());
    }
}
