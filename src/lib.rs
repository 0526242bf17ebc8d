//! # Liftfold
//!
//! Folding and lifting over effect containers whose nesting depth is only
//! known at run time.
//!
//! ## Overview
//!
//! Four container variants share one combining contract ([`Applicative`]):
//! - **Outcome**: a success or a failure, first failure wins
//! - **Presence**: a value or nothing
//! - **Deferred**: a lazy, re-runnable [`Task`]
//! - **Sequence**: nondeterministic choice, combined by cross product
//!
//! On top of that contract the crate provides:
//! - [`traverse_reduce`]: fold a list of containers into one container
//! - [`traverse_reduce_while`]: the same fold with a stop condition that
//!   never touches the remaining items
//! - [`traverse_reduce_deep`] and [`lift_first_of_two`]: lift a plain binary
//!   function through M nested layers
//! - [`pairs`]: attach map keys to values inside nested containers
//! - [`RunConfig`]: run a task and route its settled value to listeners
//!
//! ## Quick Example
//!
//! ```rust
//! use liftfold::{traverse_reduce, traverse_reduce_deep, Container, Value};
//!
//! let add = |a: Value, b: Value| Value::from(a.as_int().unwrap() + b.as_int().unwrap());
//!
//! // One layer: the first failure short-circuits the fold
//! let sum = traverse_reduce(add, Container::ok(0), [Container::ok(1), Container::ok(2)]);
//! assert_eq!(sum, Container::ok(3));
//!
//! let failed = traverse_reduce(add, Container::ok(0), [Container::ok(1), Container::err("nope")]);
//! assert_eq!(failed, Container::err("nope"));
//!
//! // Two layers: Ok(Just(n))
//! let ok_just = |n: i64| Container::ok(Container::just(n));
//! let deep = traverse_reduce_deep(2, add, ok_just(0), [ok_just(1), ok_just(2), ok_just(3)]);
//! assert_eq!(deep, ok_just(6));
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod applicative;
pub mod container;
pub mod error;
pub mod lift;
pub mod pairs;
pub mod run;
pub mod task;
pub mod testing;
pub mod traverse;
pub mod value;

// Re-exports
pub use applicative::{Applicative, Chain};
pub use container::{nested_unit, Combine, Container, Kind};
pub use error::{LiftError, UnhandledRejection};
pub use lift::{lift_combine, lift_first_of_two, traverse_reduce_deep, Constructor, LiftFirst, PartialLift};
pub use pairs::{keyed_pairs, map_of_lists_to_deep_pairs, map_to_deep_pairs, pairs_of_lists_to_deep_pairs};
pub use run::{default_run_config, default_run_to_result_config, RunConfig};
pub use task::{Resolver, Settled, Task};
pub use traverse::{traverse_reduce, traverse_reduce_while, ReducePolicy};
pub use value::{Function, Map, Value};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::applicative::{Applicative, Chain};
    pub use crate::container::{nested_unit, Container, Kind};
    pub use crate::error::LiftError;
    pub use crate::lift::{lift_first_of_two, traverse_reduce_deep};
    pub use crate::run::{default_run_config, default_run_to_result_config, RunConfig};
    pub use crate::task::Task;
    pub use crate::traverse::{traverse_reduce, traverse_reduce_while, ReducePolicy};
    pub use crate::value::Value;
}
