//! The container variant model
//!
//! [`Container`] is the closed union of the four effect variants. It is what
//! folds and lifts operate on. Every operation dispatches to the variant's
//! [`Applicative`]/[`Chain`] implementation; the only thing the union adds
//! is the check that both operands of a combine are the same variant.
//!
//! # Examples
//!
//! ```
//! use liftfold::{Container, Value};
//!
//! let add = |a: Value, b: Value| Value::from(a.as_int().unwrap() + b.as_int().unwrap());
//!
//! assert_eq!(Container::ok(1).lift2(Container::ok(2), add), Container::ok(3));
//! assert_eq!(Container::just(1).lift2(Container::nothing(), add), Container::nothing());
//! assert_eq!(
//!     Container::sequence([1, 2]).lift2(Container::sequence([10, 11]), add),
//!     Container::sequence([11, 12, 12, 13])
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use crate::applicative::{Applicative, Chain};
use crate::error::{raise, LiftError};
use crate::task::Task;
use crate::value::Value;

/// A binary function over plain values, shared across fold steps.
pub type Combine = Arc<dyn Fn(Value, Value) -> Value + Send + Sync>;

/// Which effect a container carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Success value or failure value.
    Outcome,
    /// Value present or absent.
    Presence,
    /// A computation executed on demand.
    Deferred,
    /// Zero or more values standing for nondeterministic choice.
    Sequence,
}

impl Kind {
    /// Wrap `value` in this kind with no added effect.
    ///
    /// ```
    /// use liftfold::{Container, Kind};
    ///
    /// assert_eq!(Kind::Outcome.unit(1.into()), Container::ok(1));
    /// assert_eq!(Kind::Sequence.unit(1.into()), Container::singleton(1));
    /// ```
    pub fn unit(self, value: Value) -> Container {
        match self {
            Kind::Outcome => Container::Outcome(Applicative::unit(value)),
            Kind::Presence => Container::Presence(Applicative::unit(value)),
            Kind::Deferred => Container::Deferred(Applicative::unit(value)),
            Kind::Sequence => Container::Sequence(Applicative::unit(value)),
        }
    }

    /// Whether combining two containers of this kind is a cross product.
    pub fn is_cartesian(self) -> bool {
        match self {
            Kind::Outcome => <Result<Value, Value> as Applicative>::CARTESIAN,
            Kind::Presence => <Option<Value> as Applicative>::CARTESIAN,
            Kind::Deferred => <Task as Applicative>::CARTESIAN,
            Kind::Sequence => <Vec<Value> as Applicative>::CARTESIAN,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Outcome => "outcome",
            Kind::Presence => "presence",
            Kind::Deferred => "deferred",
            Kind::Sequence => "sequence",
        })
    }
}

/// Build the constructor for an M-deep container, outermost kind first.
///
/// The returned function wraps a plain value in `kinds[kinds.len() - 1]`,
/// then that in the kind before it, and so on out to `kinds[0]`.
///
/// ```
/// use liftfold::{nested_unit, Container, Kind};
///
/// let ok_just = nested_unit(&[Kind::Outcome, Kind::Presence]);
/// assert_eq!(ok_just(6.into()), Container::ok(Container::just(6)));
/// ```
///
/// # Panics
///
/// Panics with [`LiftError::InvalidDepth`] if `kinds` is empty.
#[track_caller]
pub fn nested_unit(kinds: &[Kind]) -> impl Fn(Value) -> Container + Send + Sync + 'static {
    let Some((&innermost, outer)) = kinds.split_last() else {
        raise(LiftError::InvalidDepth(0))
    };
    let outer = outer.to_vec();
    move |value| {
        outer
            .iter()
            .rev()
            .fold(innermost.unit(value), |inner, kind| kind.unit(inner.into()))
    }
}

/// A value wrapped in one layer of effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    /// `Ok(value)` or `Err(failure)`.
    Outcome(Result<Value, Value>),
    /// `Some(value)` or `None`.
    Presence(Option<Value>),
    /// A deferred computation.
    Deferred(Task),
    /// Nondeterministic choice among the listed values.
    Sequence(Vec<Value>),
}

impl Container {
    /// A successful outcome.
    pub fn ok(value: impl Into<Value>) -> Self {
        Container::Outcome(Ok(value.into()))
    }

    /// A failed outcome.
    pub fn err(failure: impl Into<Value>) -> Self {
        Container::Outcome(Err(failure.into()))
    }

    /// A present value.
    pub fn just(value: impl Into<Value>) -> Self {
        Container::Presence(Some(value.into()))
    }

    /// An absent value.
    pub fn nothing() -> Self {
        Container::Presence(None)
    }

    /// A deferred computation that resolves immediately.
    pub fn of(value: impl Into<Value>) -> Self {
        Container::Deferred(Task::of(value))
    }

    /// A deferred computation that rejects immediately.
    pub fn rejected(reason: impl Into<Value>) -> Self {
        Container::Deferred(Task::rejected(reason))
    }

    /// A sequence of choices.
    pub fn sequence<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Container::Sequence(values.into_iter().map(Into::into).collect())
    }

    /// A sequence holding exactly one choice.
    ///
    /// Wrap a whole list this way when the list is one value rather than a
    /// set of alternatives to expand over.
    pub fn singleton(value: impl Into<Value>) -> Self {
        Container::Sequence(vec![value.into()])
    }

    /// The variant of this container.
    pub fn kind(&self) -> Kind {
        match self {
            Container::Outcome(_) => Kind::Outcome,
            Container::Presence(_) => Kind::Presence,
            Container::Deferred(_) => Kind::Deferred,
            Container::Sequence(_) => Kind::Sequence,
        }
    }

    /// Whether this container combines by cartesian expansion.
    pub fn is_cartesian(&self) -> bool {
        self.kind().is_cartesian()
    }

    /// The deferred computation inside, if this is a deferred container.
    pub fn as_task(&self) -> Option<&Task> {
        match self {
            Container::Deferred(task) => Some(task),
            _ => None,
        }
    }

    /// Transform the contained value(s).
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        match self {
            Container::Outcome(r) => Container::Outcome(r.fmap(f)),
            Container::Presence(o) => Container::Presence(o.fmap(f)),
            Container::Deferred(t) => Container::Deferred(t.fmap(f)),
            Container::Sequence(v) => Container::Sequence(v.fmap(f)),
        }
    }

    /// Apply the function(s) in `self` to the value(s) in `values`.
    ///
    /// # Panics
    ///
    /// Panics with [`LiftError::KindMismatch`] if the two containers are of
    /// different kinds. Use [`Container::try_ap`] to get the error instead.
    #[track_caller]
    pub fn ap(self, values: Container) -> Container {
        self.try_ap(values).unwrap_or_else(|err| raise(err))
    }

    /// Apply the function(s) in `self` to the value(s) in `values`, reporting
    /// mismatched kinds as an error.
    pub fn try_ap(self, values: Container) -> Result<Container, LiftError> {
        match (self, values) {
            (Container::Outcome(f), Container::Outcome(x)) => Ok(Container::Outcome(f.ap(x))),
            (Container::Presence(f), Container::Presence(x)) => Ok(Container::Presence(f.ap(x))),
            (Container::Deferred(f), Container::Deferred(x)) => Ok(Container::Deferred(f.ap(x))),
            (Container::Sequence(f), Container::Sequence(x)) => Ok(Container::Sequence(f.ap(x))),
            (f, x) => Err(LiftError::KindMismatch {
                left: f.kind(),
                right: x.kind(),
            }),
        }
    }

    /// Feed the contained value(s) into `f` and flatten.
    ///
    /// # Panics
    ///
    /// Panics with [`LiftError::KindMismatch`] if `f` returns a container of
    /// another kind. For deferred containers that happens when the step runs.
    pub fn chain<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Container + Send + Sync + 'static,
    {
        let kind = self.kind();
        let expect = move |c: Container| -> Container {
            if c.kind() != kind {
                raise(LiftError::KindMismatch {
                    left: kind,
                    right: c.kind(),
                });
            }
            c
        };
        match self {
            Container::Outcome(r) => Container::Outcome(r.chain(move |v| match expect(f(v)) {
                Container::Outcome(next) => next,
                _ => unreachable!("kind checked above"),
            })),
            Container::Presence(o) => Container::Presence(o.chain(move |v| match expect(f(v)) {
                Container::Presence(next) => next,
                _ => unreachable!("kind checked above"),
            })),
            Container::Deferred(t) => Container::Deferred(t.chain(move |v| match expect(f(v)) {
                Container::Deferred(next) => next,
                _ => unreachable!("kind checked above"),
            })),
            Container::Sequence(s) => Container::Sequence(s.chain(move |v| match expect(f(v)) {
                Container::Sequence(next) => next,
                _ => unreachable!("kind checked above"),
            })),
        }
    }

    /// Combine two containers of the same kind with a binary function.
    ///
    /// This is `self.map(curry(f)).ap(other)`: the plain function is curried
    /// on the left operand, lifted, then applied against the right operand.
    #[track_caller]
    pub fn lift2<F>(self, other: Container, f: F) -> Container
    where
        F: Fn(Value, Value) -> Value + Send + Sync + 'static,
    {
        self.lift2_with(other, Arc::new(f))
    }

    #[track_caller]
    pub(crate) fn lift2_with(self, other: Container, f: Combine) -> Container {
        self.map(curry(f)).ap(other)
    }
}

/// Turn a binary function into one returning a function value.
///
/// The left argument is cloned into each partial application because a
/// sequence may apply the same partial to several right arguments.
pub(crate) fn curry(f: Combine) -> impl Fn(Value) -> Value + Send + Sync + 'static {
    move |left| {
        let f = Arc::clone(&f);
        Value::function(move |right| f(left.clone(), right))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Container {
    /// Eager containers serialize as tagged values (`{"Ok": ..}`,
    /// `{"Err": ..}`, `{"Just": ..}`, `"Nothing"`, or a list). A deferred
    /// container has no value to serialize until it runs, so it is an error.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::Error;

        match self {
            Container::Outcome(Ok(v)) => serializer.serialize_newtype_variant("Outcome", 0, "Ok", v),
            Container::Outcome(Err(e)) => {
                serializer.serialize_newtype_variant("Outcome", 1, "Err", e)
            }
            Container::Presence(Some(v)) => {
                serializer.serialize_newtype_variant("Presence", 0, "Just", v)
            }
            Container::Presence(None) => serializer.serialize_unit_variant("Presence", 1, "Nothing"),
            Container::Sequence(values) => serde::Serialize::serialize(values, serializer),
            Container::Deferred(_) => Err(S::Error::custom(
                "deferred containers cannot be serialized before they run",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(a: Value, b: Value) -> Value {
        Value::from(a.as_int().unwrap() + b.as_int().unwrap())
    }

    #[test]
    fn test_kind_reports_variant() {
        assert_eq!(Container::ok(1).kind(), Kind::Outcome);
        assert_eq!(Container::nothing().kind(), Kind::Presence);
        assert_eq!(Container::of(1).kind(), Kind::Deferred);
        assert_eq!(Container::sequence([1]).kind(), Kind::Sequence);
    }

    #[test]
    fn test_only_sequence_is_cartesian() {
        assert!(Container::sequence([1, 2]).is_cartesian());
        assert!(!Container::ok(1).is_cartesian());
        assert!(!Container::just(1).is_cartesian());
        assert!(!Container::of(1).is_cartesian());
    }

    #[test]
    fn test_lift2_outcome_left_failure_wins() {
        let result = Container::err("left").lift2(Container::err("right"), add);
        assert_eq!(result, Container::err("left"));
    }

    #[test]
    fn test_lift2_sequence_is_cartesian() {
        let result = Container::sequence([1, 2]).lift2(Container::sequence([10, 11]), add);
        assert_eq!(result, Container::sequence([11, 12, 12, 13]));
    }

    #[test]
    fn test_try_ap_reports_mismatch() {
        let err = Container::ok(Value::function(|v| v))
            .try_ap(Container::singleton(1))
            .unwrap_err();
        assert_eq!(
            err,
            LiftError::KindMismatch {
                left: Kind::Outcome,
                right: Kind::Sequence,
            }
        );
    }

    #[test]
    #[should_panic(expected = "cannot combine a presence container with an outcome container")]
    fn test_ap_panics_on_mismatch() {
        Container::just(Value::function(|v| v)).ap(Container::ok(1));
    }

    #[test]
    fn test_chain_short_circuits_absence() {
        let result = Container::nothing().chain(|v| Container::just(v));
        assert_eq!(result, Container::nothing());
    }

    #[test]
    #[should_panic(expected = "cannot combine an outcome container with a presence container")]
    fn test_chain_rejects_other_kinds() {
        Container::ok(1).chain(|v| Container::just(v));
    }

    #[test]
    fn test_nested_unit_wraps_outermost_first() {
        let ctor = nested_unit(&[Kind::Outcome, Kind::Presence, Kind::Sequence]);
        assert_eq!(
            ctor(Value::from(1)),
            Container::ok(Container::just(Container::singleton(1)))
        );
    }

    #[test]
    #[should_panic(expected = "lift depth must be at least 1")]
    fn test_nested_unit_needs_a_kind() {
        let _ = nested_unit(&[]);
    }

    #[test]
    fn test_kind_unit_matches_constructors() {
        assert_eq!(Kind::Presence.unit(Value::from(1)), Container::just(1));
        assert_eq!(Kind::Outcome.unit(Value::from(1)), Container::ok(1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_eager_containers_serialize_tagged() {
        let value = Container::ok(Container::just(Container::sequence([1, 2])));
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"Ok":{"Just":[1,2]}}"#
        );
        assert_eq!(
            serde_json::to_string(&Container::nothing()).unwrap(),
            r#""Nothing""#
        );
        assert!(serde_json::to_string(&Container::of(1)).is_err());
    }
}
