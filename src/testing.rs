//! Testing utilities for containers and deferred computations
//!
//! This module provides assertion macros for the eager container variants, a
//! helper that drives a [`Task`] to completion outside an async runtime, and,
//! with the `proptest` feature, an `Arbitrary` implementation for plain
//! [`Value`](crate::Value)s.
//!
//! # Examples
//!
//! ```rust
//! use liftfold::{assert_absent, assert_err, assert_ok, assert_present, Container};
//!
//! assert_ok!(Container::ok(42));
//! assert_ok!(Container::ok(42), 42);
//! assert_err!(Container::err("boom"), "boom");
//! assert_present!(Container::just(1));
//! assert_absent!(Container::nothing());
//! ```

use crate::task::{Settled, Task};
#[cfg(feature = "proptest")]
use crate::value::Value;

/// Run a task to completion on the current thread.
///
/// Only suitable for tasks that do not need a specific async runtime.
///
/// ```rust
/// use liftfold::{testing::run_blocking, Task, Value};
///
/// assert_eq!(run_blocking(&Task::of(1)), Ok(Value::from(1)));
/// ```
pub fn run_blocking(task: &Task) -> Settled {
    futures::executor::block_on(task.run())
}

/// Assert that a container is a successful outcome, optionally holding
/// `expected`.
///
/// # Example
///
/// ```rust
/// use liftfold::{assert_ok, Container};
///
/// assert_ok!(Container::ok(6), 6);
/// ```
#[macro_export]
macro_rules! assert_ok {
    ($container:expr) => {
        match $container {
            $crate::Container::Outcome(Ok(_)) => {}
            other => {
                panic!("Expected Ok outcome, got: {:?}", other);
            }
        }
    };
    ($container:expr, $expected:expr) => {
        match $container {
            $crate::Container::Outcome(Ok(value)) => {
                assert_eq!(value, $crate::Value::from($expected));
            }
            other => {
                panic!("Expected Ok outcome, got: {:?}", other);
            }
        }
    };
}

/// Assert that a container is a failed outcome, optionally failing with
/// `expected`.
///
/// # Example
///
/// ```rust
/// use liftfold::{assert_err, Container};
///
/// assert_err!(Container::err("bad"));
/// ```
#[macro_export]
macro_rules! assert_err {
    ($container:expr) => {
        match $container {
            $crate::Container::Outcome(Err(_)) => {}
            other => {
                panic!("Expected Err outcome, got: {:?}", other);
            }
        }
    };
    ($container:expr, $expected:expr) => {
        match $container {
            $crate::Container::Outcome(Err(failure)) => {
                assert_eq!(failure, $crate::Value::from($expected));
            }
            other => {
                panic!("Expected Err outcome, got: {:?}", other);
            }
        }
    };
}

/// Assert that a container is a present value, optionally equal to
/// `expected`.
#[macro_export]
macro_rules! assert_present {
    ($container:expr) => {
        match $container {
            $crate::Container::Presence(Some(_)) => {}
            other => {
                panic!("Expected present value, got: {:?}", other);
            }
        }
    };
    ($container:expr, $expected:expr) => {
        match $container {
            $crate::Container::Presence(Some(value)) => {
                assert_eq!(value, $crate::Value::from($expected));
            }
            other => {
                panic!("Expected present value, got: {:?}", other);
            }
        }
    };
}

/// Assert that a container is an absent value.
#[macro_export]
macro_rules! assert_absent {
    ($container:expr) => {
        match $container {
            $crate::Container::Presence(None) => {}
            other => {
                panic!("Expected absent value, got: {:?}", other);
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

/// Plain data only: no containers and no functions. Floats are finite so
/// generated values compare equal to themselves.
#[cfg(feature = "proptest")]
impl Arbitrary for Value {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            (-1.0e9..1.0e9f64).prop_map(Value::Float),
            "[a-z]{0,8}".prop_map(Value::Str),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
                prop::collection::vec(("[a-z]{1,4}", inner), 0..4)
                    .prop_map(|entries| Value::Map(entries.into_iter().collect())),
            ]
        })
        .boxed()
    }
}
