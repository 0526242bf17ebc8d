//! Lifting binary functions through M nested container layers
//!
//! A depth-M container is `C1<C2<...<CM<T>>...>>`, where every layer may be
//! a different variant. To combine two of them the plain function is lifted
//! one layer at a time: at the outermost layer the layer's own `ap` pairs the
//! operands up, and the function it applies is the same lift one layer
//! shallower. At depth 1 that is the plain function itself.
//!
//! Because each layer combines with its own `ap`, a sequence layer expands to
//! the full cross product of its operands. If a list should instead be
//! treated as one value, build that layer with [`Container::singleton`]; the
//! lifter cannot tell the two intentions apart.
//!
//! # Examples
//!
//! ```
//! use liftfold::{lift::traverse_reduce_deep, Container, Value};
//!
//! let add = |a: Value, b: Value| Value::from(a.as_int().unwrap() + b.as_int().unwrap());
//! let ok_just = |n: i64| Container::ok(Container::just(n));
//!
//! let total = traverse_reduce_deep(2, add, ok_just(0), [ok_just(1), ok_just(2), ok_just(3)]);
//! assert_eq!(total, ok_just(6));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::container::{Combine, Container};
use crate::error::{raise, LiftError};
use crate::traverse::reduce_with;
use crate::value::Value;

/// Constructor for a fully nested unit: `v` → `C1<...<CM<v>>>`.
pub type Constructor = Arc<dyn Fn(Value) -> Container + Send + Sync>;

/// Lift `combine` so that it combines values sitting `depth - 1` container
/// layers deep.
///
/// The result is the function to hand to the outermost layer: its arguments
/// are the values directly inside the outermost containers.
///
/// # Panics
///
/// Panics with [`LiftError::InvalidDepth`] when `depth` is zero. The returned
/// function panics with [`LiftError::NotAContainer`] if an operand runs out
/// of layers before the requested depth.
#[track_caller]
pub fn lift_combine<F>(depth: usize, combine: F) -> Combine
where
    F: Fn(Value, Value) -> Value + Send + Sync + 'static,
{
    lift_with(depth, Arc::new(combine))
}

#[track_caller]
fn lift_with(depth: usize, combine: Combine) -> Combine {
    if depth == 0 {
        raise(LiftError::InvalidDepth(depth));
    }
    (1..depth).fold(combine, |inner, remaining| -> Combine {
        Arc::new(move |left: Value, right: Value| {
            let left = layer(left, remaining);
            let right = layer(right, remaining);
            tracing::trace!(
                remaining,
                kind = %left.kind(),
                cartesian = left.is_cartesian(),
                "lifting through layer"
            );
            Value::from(left.lift2_with(right, Arc::clone(&inner)))
        })
    })
}

fn layer(value: Value, remaining: usize) -> Container {
    value.into_container().unwrap_or_else(|found| {
        raise(LiftError::NotAContainer {
            remaining,
            found: found.type_name(),
        })
    })
}

/// Fold depth-M containers with a function over their innermost values.
///
/// This is [`traverse_reduce`](crate::traverse::traverse_reduce) with
/// `combine` lifted through `depth - 1` inner layers first. At depth 1 the two
/// are the same operation.
///
/// `depth` does not have to reach the bottom of the nesting: at a shallower
/// depth `combine` receives the inner containers themselves.
///
/// # Panics
///
/// Panics with [`LiftError::InvalidDepth`] for a depth of zero, with
/// [`LiftError::KindMismatch`] when layers of different kinds meet, and with
/// [`LiftError::NotAContainer`] when an operand is shallower than `depth`.
///
/// # Examples
///
/// ```
/// use liftfold::{lift::traverse_reduce_deep, Container, Value};
///
/// let divide = |a: Value, b: Value| Value::from(a.as_float().unwrap() / b.as_float().unwrap());
/// let deep = |values: &[f64]| {
///     Container::ok(Container::just(Container::sequence(values.iter().copied())))
/// };
///
/// let result = traverse_reduce_deep(
///     3,
///     divide,
///     deep(&[1000.0]),
///     [deep(&[10.0, 100.0, 1000.0]), deep(&[1.0, 2.0, 4.0])],
/// );
/// assert_eq!(
///     result,
///     deep(&[100.0, 50.0, 25.0, 10.0, 5.0, 2.5, 1.0, 0.5, 0.25])
/// );
/// ```
#[track_caller]
pub fn traverse_reduce_deep<F, I>(depth: usize, combine: F, initial: Container, items: I) -> Container
where
    F: Fn(Value, Value) -> Value + Send + Sync + 'static,
    I: IntoIterator<Item = Container>,
{
    tracing::debug!(depth, kind = %initial.kind(), "reducing nested containers");
    reduce_with(lift_combine(depth, combine), initial, items)
}

/// Lift a two-argument function whose first argument stays plain and whose
/// second argument is a depth-M container.
///
/// The first argument is wrapped with `constructor` and combined with the
/// second using the depth-M lift of `f`.
///
/// # Examples
///
/// ```
/// use liftfold::{lift::lift_first_of_two, Container, Value};
///
/// let add = |a: Value, b: Value| Value::from(a.as_int().unwrap() + b.as_int().unwrap());
/// let adder = lift_first_of_two(1, Container::ok, add);
///
/// assert_eq!(adder.apply(5).apply(Container::ok(1)), Container::ok(6));
/// assert_eq!(adder.call(6, Container::ok(1)), Container::ok(7));
/// ```
///
/// # Panics
///
/// Panics with [`LiftError::InvalidDepth`] when `depth` is zero.
#[track_caller]
pub fn lift_first_of_two<C, F>(depth: usize, constructor: C, f: F) -> LiftFirst
where
    C: Fn(Value) -> Container + Send + Sync + 'static,
    F: Fn(Value, Value) -> Value + Send + Sync + 'static,
{
    LiftFirst {
        depth,
        constructor: Arc::new(constructor),
        lifted: lift_combine(depth, f),
    }
}

/// A binary function lifted for a plain first argument and a depth-M second
/// argument. Built by [`lift_first_of_two`].
#[derive(Clone)]
pub struct LiftFirst {
    depth: usize,
    constructor: Constructor,
    lifted: Combine,
}

impl LiftFirst {
    /// Depth the function was lifted to.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Fix the plain first argument.
    pub fn apply(&self, first: impl Into<Value>) -> PartialLift {
        PartialLift {
            first: (self.constructor)(first.into()),
            lifted: Arc::clone(&self.lifted),
        }
    }

    /// Apply both arguments at once.
    #[track_caller]
    pub fn call(&self, first: impl Into<Value>, second: Container) -> Container {
        self.apply(first).apply(second)
    }
}

impl fmt::Debug for LiftFirst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiftFirst")
            .field("depth", &self.depth)
            .field("constructor", &"<function>")
            .finish()
    }
}

/// A [`LiftFirst`] with its first argument already wrapped.
#[derive(Clone)]
pub struct PartialLift {
    first: Container,
    lifted: Combine,
}

impl PartialLift {
    /// The wrapped first argument.
    pub fn first(&self) -> &Container {
        &self.first
    }

    /// Combine the wrapped first argument with `second`.
    #[track_caller]
    pub fn apply(&self, second: Container) -> Container {
        self.first
            .clone()
            .lift2_with(second, Arc::clone(&self.lifted))
    }
}

impl fmt::Debug for PartialLift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialLift")
            .field("first", &self.first)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{nested_unit, Kind};

    fn add(a: Value, b: Value) -> Value {
        Value::from(a.as_int().unwrap() + b.as_int().unwrap())
    }

    fn concat(a: Value, b: Value) -> Value {
        match (a, b) {
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Value::List(a)
            }
            (Value::Str(a), Value::Str(b)) => Value::Str(a + &b),
            (Value::Container(a), Value::Container(b)) => match (*a, *b) {
                (Container::Sequence(mut a), Container::Sequence(b)) => {
                    a.extend(b);
                    Value::from(Container::Sequence(a))
                }
                other => panic!("cannot concat {other:?}"),
            },
            other => panic!("cannot concat {other:?}"),
        }
    }

    fn ok_just(n: i64) -> Container {
        Container::ok(Container::just(n))
    }

    #[test]
    fn test_depth_one_is_plain_reduce() {
        let items = vec![Container::ok(1), Container::ok(2)];
        assert_eq!(
            traverse_reduce_deep(1, add, Container::ok(0), items.clone()),
            crate::traverse::traverse_reduce(add, Container::ok(0), items)
        );
    }

    #[test]
    fn test_depth_two_outcome_of_presence() {
        let result = traverse_reduce_deep(2, add, ok_just(0), [ok_just(1), ok_just(2), ok_just(3)]);
        assert_eq!(result, ok_just(6));
    }

    #[test]
    fn test_depth_two_inner_absence_short_circuits_inner_layer_only() {
        let items = [ok_just(1), Container::ok(Container::nothing()), ok_just(3)];
        assert_eq!(
            traverse_reduce_deep(2, add, ok_just(0), items),
            Container::ok(Container::nothing())
        );
    }

    #[test]
    fn test_depth_two_outer_failure_wins() {
        let items = [ok_just(1), Container::err("outer"), Container::ok(Container::nothing())];
        assert_eq!(
            traverse_reduce_deep(2, add, ok_just(0), items),
            Container::err("outer")
        );
    }

    #[test]
    fn test_shallower_depth_hands_inner_containers_to_combine() {
        let deep = |values: &[i64]| {
            Container::ok(Container::just(Container::sequence(values.iter().copied())))
        };
        let result = traverse_reduce_deep(2, concat, deep(&[]), [deep(&[10, 100, 1000]), deep(&[1, 2, 4])]);
        assert_eq!(result, deep(&[10, 100, 1000, 1, 2, 4]));
    }

    #[test]
    fn test_sequence_layer_is_cartesian_not_zip() {
        let ok_seq = |values: &[i64]| Container::ok(Container::sequence(values.iter().copied()));
        let adder = lift_first_of_two(2, |v| Container::ok(v), add);
        // The first argument is already a sequence, so the constructor only adds the outcome.
        let result = adder.call(Container::sequence([1, 2]), ok_seq(&[10, 11]));
        assert_eq!(result, ok_seq(&[11, 12, 12, 13]));
    }

    #[test]
    fn test_lift_first_depth_two() {
        let ctor = nested_unit(&[Kind::Outcome, Kind::Presence]);
        let adder = lift_first_of_two(2, ctor, add);
        assert_eq!(adder.apply(5).apply(ok_just(1)), ok_just(6));
        assert_eq!(adder.apply(6).apply(ok_just(1)), ok_just(7));
        assert_eq!(adder.depth(), 2);
    }

    #[test]
    fn test_lift_first_singleton_keeps_list_whole() {
        // Just [list]: the inner sequence holds the whole list as one value.
        let ctor = |v: Value| Container::just(Container::singleton(v));
        let concatter = lift_first_of_two(2, ctor, concat);
        let result = concatter.call(Value::list(["a"]), ctor(Value::list(["b", "c", "d"])));
        assert_eq!(result, ctor(Value::list(["a", "b", "c", "d"])));
    }

    #[test]
    fn test_lift_first_elementwise_over_sequence() {
        // Just [items]: each item is a separate choice.
        let ctor = |v: Value| match v {
            Value::List(items) => Container::just(Container::Sequence(items)),
            other => Container::just(Container::singleton(other)),
        };
        let appender = lift_first_of_two(2, ctor, concat);
        let result = appender.call("a", ctor(Value::list(["b", "c", "d"])));
        assert_eq!(result, ctor(Value::list(["ab", "ac", "ad"])));
    }

    #[test]
    fn test_lift_first_list_of_presence() {
        let ctor = |v: Value| Container::singleton(Container::just(v));
        let appender = lift_first_of_two(2, ctor, concat);
        let list_of_maybes = Container::sequence(["b", "c", "d"].map(Container::just));
        assert_eq!(
            appender.call("a", list_of_maybes),
            Container::sequence(["ab", "ac", "ad"].map(Container::just))
        );
    }

    #[test]
    #[should_panic(expected = "lift depth must be at least 1, got 0")]
    fn test_zero_depth_panics() {
        traverse_reduce_deep(0, add, Container::ok(0), []);
    }

    #[test]
    #[should_panic(expected = "expected a container 1 layer(s) above the plain value, found int")]
    fn test_too_shallow_operand_panics() {
        traverse_reduce_deep(2, add, Container::ok(0), [Container::ok(1)]);
    }

    #[test]
    #[should_panic(expected = "cannot combine an outcome container with a presence container")]
    fn test_mismatched_inner_layers_panic() {
        traverse_reduce_deep(
            2,
            add,
            Container::ok(Container::ok(0)),
            [Container::ok(Container::just(1))],
        );
    }

    #[tokio::test]
    async fn test_deferred_outer_layer() {
        let of_just = |n: i64| Container::of(Container::just(n));
        let result = traverse_reduce_deep(2, add, of_just(0), [of_just(1), of_just(2)]);
        let task = result.as_task().unwrap();
        assert_eq!(task.run().await, Ok(Value::from(Container::just(3))));
    }
}
