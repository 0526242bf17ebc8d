//! Attaching keys to values inside containers
//!
//! A reducer takes a list, not a map. To fold a map of containers, each entry
//! is first turned into a container of its `[key, value]` pair, keeping the
//! effect of the original value. The helpers here do that for single-layer
//! containers, for M-deep containers, and for maps or pair lists whose values
//! are lists of M-deep containers.
//!
//! # Examples
//!
//! ```
//! use indexmap::IndexMap;
//! use liftfold::{pairs::keyed_pairs, traverse_reduce, Container, Value};
//!
//! let merge = |acc: Value, pair: Value| {
//!     let mut map = acc.as_map().cloned().unwrap_or_default();
//!     if let [k, v] = pair.as_list().unwrap() {
//!         map.insert(k.as_str().unwrap().to_string(), v.clone());
//!     }
//!     Value::Map(map)
//! };
//!
//! let entries = IndexMap::from([
//!     ("a".to_string(), Container::ok("a")),
//!     ("b".to_string(), Container::ok("b")),
//! ]);
//! let merged = traverse_reduce(merge, Container::ok(Value::map_of::<&str, Value, _>([])), keyed_pairs(entries));
//! assert_eq!(merged, Container::ok(Value::map_of([("a", "a"), ("b", "b")])));
//! ```

use std::sync::Arc;

use indexmap::IndexMap;

use crate::container::Container;
use crate::error::{raise, LiftError};
use crate::lift::{lift_first_of_two, traverse_reduce_deep, Constructor, LiftFirst};
use crate::value::Value;

/// Turn each map entry into a container of its `[key, value]` pair.
///
/// Entries keep insertion order. A failed or absent value stays failed or
/// absent; the key is only attached to values that are there.
pub fn keyed_pairs(entries: IndexMap<String, Container>) -> Vec<Container> {
    entries
        .into_iter()
        .map(|(key, container)| {
            let kind = container.kind();
            container.chain(move |value| kind.unit(Value::pair(key.clone(), value)))
        })
        .collect()
}

/// Attach each key to the innermost value of its M-deep container.
///
/// `constructor` builds the same M-deep nesting around a plain value.
///
/// ```
/// use indexmap::IndexMap;
/// use liftfold::{nested_unit, pairs::map_to_deep_pairs, Container, Kind, Value};
///
/// let ok_just = nested_unit(&[Kind::Outcome, Kind::Presence]);
/// let entries = IndexMap::from([
///     ("a".to_string(), ok_just(1.into())),
///     ("b".to_string(), ok_just(2.into())),
/// ]);
/// assert_eq!(
///     map_to_deep_pairs(2, ok_just, entries),
///     vec![
///         Container::ok(Container::just(Value::pair("a", 1))),
///         Container::ok(Container::just(Value::pair("b", 2))),
///     ]
/// );
/// ```
///
/// # Panics
///
/// Panics with [`LiftError::InvalidDepth`](crate::LiftError::InvalidDepth)
/// when `depth` is zero.
#[track_caller]
pub fn map_to_deep_pairs<C>(depth: usize, constructor: C, entries: IndexMap<String, Container>) -> Vec<Container>
where
    C: Fn(Value) -> Container + Send + Sync + 'static,
{
    let keyer = pair_keyer(depth, Arc::new(constructor));
    entries
        .into_iter()
        .map(|(key, container)| keyer.call(key, container))
        .collect()
}

/// Fold each list of M-deep containers into one M-deep container of a list,
/// then attach the key.
///
/// ```
/// use indexmap::IndexMap;
/// use liftfold::{pairs::map_of_lists_to_deep_pairs, Container, Value};
///
/// let entries = IndexMap::from([
///     ("b".to_string(), vec![Container::just(1), Container::just(2)]),
///     ("c".to_string(), vec![Container::just(3), Container::just(4)]),
/// ]);
/// assert_eq!(
///     map_of_lists_to_deep_pairs(1, |v| Container::just(v), entries),
///     vec![
///         Container::just(Value::pair("b", Value::list([1, 2]))),
///         Container::just(Value::pair("c", Value::list([3, 4]))),
///     ]
/// );
/// ```
///
/// # Panics
///
/// Panics with [`LiftError::InvalidDepth`](crate::LiftError::InvalidDepth)
/// when `depth` is zero.
#[track_caller]
pub fn map_of_lists_to_deep_pairs<C>(
    depth: usize,
    constructor: C,
    entries: IndexMap<String, Vec<Container>>,
) -> Vec<Container>
where
    C: Fn(Value) -> Container + Send + Sync + 'static,
{
    pairs_of_lists_to_deep_pairs(depth, constructor, entries)
}

/// Like [`map_of_lists_to_deep_pairs`], for keys given as a list of pairs.
///
/// Duplicate keys are kept, each producing its own pair.
///
/// # Panics
///
/// Panics with [`LiftError::InvalidDepth`] when `depth` is zero, and with
/// [`LiftError::NotAList`] when `constructor` does not keep the empty list
/// it is given as the innermost value.
#[track_caller]
pub fn pairs_of_lists_to_deep_pairs<C, K, I>(depth: usize, constructor: C, pairs: I) -> Vec<Container>
where
    C: Fn(Value) -> Container + Send + Sync + 'static,
    K: Into<Value>,
    I: IntoIterator<Item = (K, Vec<Container>)>,
{
    let constructor: Constructor = Arc::new(constructor);
    let keyer = pair_keyer(depth, Arc::clone(&constructor));
    pairs
        .into_iter()
        .map(|(key, containers)| {
            let folded = traverse_reduce_deep(
                depth,
                append,
                constructor(Value::List(Vec::new())),
                containers,
            );
            keyer.call(key, folded)
        })
        .collect()
}

#[track_caller]
fn pair_keyer(depth: usize, constructor: Constructor) -> LiftFirst {
    lift_first_of_two(depth, move |v| constructor(v), Value::pair)
}

// The accumulator is seeded with `constructor(List[])`, so it stays a list
// unless the constructor rewrites its argument.
#[track_caller]
fn append(acc: Value, item: Value) -> Value {
    match acc {
        Value::List(mut items) => {
            items.push(item);
            Value::List(items)
        }
        other => raise(LiftError::NotAList(other.type_name())),
    }
}
