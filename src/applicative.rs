//! The capability set every container variant supplies
//!
//! The reducer and the lifter never look at which variant they are folding.
//! They only ever call the operations below, and each variant decides what
//! "combine" means for it:
//!
//! | Variant  | Carrier                 | `unit(v)`    | `ap` rule                                    |
//! |----------|-------------------------|--------------|----------------------------------------------|
//! | Outcome  | `Result<Value, Value>`  | `Ok(v)`      | first failure wins, left before right        |
//! | Presence | `Option<Value>`         | `Some(v)`    | any absence makes the result absent          |
//! | Deferred | [`Task`](crate::Task)   | `Task::of(v)`| left runs first; right never starts on error |
//! | Sequence | `Vec<Value>`            | `vec![v]`    | cartesian: every function with every value   |
//!
//! # Laws
//!
//! Every implementation satisfies the applicative laws:
//!
//! ```text
//! identity:      unit(id).ap(v)                      == v
//! homomorphism:  unit(f).ap(unit(x))                 == unit(f(x))
//! interchange:   u.ap(unit(y))                       == unit(|f| f(y)).ap(u)
//! composition:   unit(compose).ap(u).ap(v).ap(w)     == u.ap(v.ap(w))
//! ```
//!
//! The property tests in `tests/applicative_laws.rs` check them per variant.
//!
//! # Examples
//!
//! ```
//! use liftfold::{Applicative, Value};
//!
//! let add = Value::function(|x| {
//!     Value::function(move |y| Value::from(x.as_int().unwrap() + y.as_int().unwrap()))
//! });
//!
//! // Cartesian expansion, left operand outermost
//! let partials = vec![Value::from(1), Value::from(2)].fmap(move |x| add.call(x));
//! let sums = partials.ap(vec![Value::from(10), Value::from(11)]);
//! let expected: Vec<Value> = vec![11.into(), 12.into(), 12.into(), 13.into()];
//! assert_eq!(sums, expected);
//! ```

use crate::value::Value;

/// Containers that can lift a value and apply a contained function.
pub trait Applicative: Sized {
    /// Whether `ap` expands to the cross product of its operands.
    ///
    /// Only the sequence variant sets this. The depth lifter relies on it
    /// being the variant's own `ap` that performs the expansion, never a zip.
    const CARTESIAN: bool = false;

    /// Wrap a plain value with no added effect.
    fn unit(value: Value) -> Self;

    /// Transform the contained value(s).
    fn fmap<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static;

    /// Apply the function(s) held by `self` to the value(s) held by `values`.
    fn ap(self, values: Self) -> Self;
}

/// Applicatives that can also sequence a dependent step.
///
/// The early-stop reducer needs this to look at the accumulated plain value
/// before it decides whether the next item is touched at all.
pub trait Chain: Applicative {
    /// Feed the contained value(s) into `f` and flatten the result.
    fn chain<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Self + Send + Sync + 'static;
}

// Outcome. When both operands failed the left failure is kept, which is what
// left-to-right evaluation would observe.
impl Applicative for Result<Value, Value> {
    fn unit(value: Value) -> Self {
        Ok(value)
    }

    fn fmap<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.map(f)
    }

    fn ap(self, values: Self) -> Self {
        let f = self?;
        let x = values?;
        Ok(f.call(x))
    }
}

impl Chain for Result<Value, Value> {
    fn chain<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Self + Send + Sync + 'static,
    {
        self.and_then(f)
    }
}

// Presence
impl Applicative for Option<Value> {
    fn unit(value: Value) -> Self {
        Some(value)
    }

    fn fmap<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.map(f)
    }

    fn ap(self, values: Self) -> Self {
        let f = self?;
        let x = values?;
        Some(f.call(x))
    }
}

impl Chain for Option<Value> {
    fn chain<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Self + Send + Sync + 'static,
    {
        self.and_then(f)
    }
}

// Sequence
impl Applicative for Vec<Value> {
    const CARTESIAN: bool = true;

    fn unit(value: Value) -> Self {
        vec![value]
    }

    fn fmap<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.into_iter().map(f).collect()
    }

    fn ap(self, values: Self) -> Self {
        let mut out = Vec::with_capacity(self.len() * values.len());
        for f in &self {
            for x in &values {
                out.push(f.call(x.clone()));
            }
        }
        out
    }
}

impl Chain for Vec<Value> {
    fn chain<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Self + Send + Sync + 'static,
    {
        self.into_iter().flat_map(f).collect()
    }
}
