//! Plain values carried inside containers
//!
//! The engine works on containers whose nesting depth is only known at run
//! time, so the payload they carry is a single dynamically typed [`Value`].
//! A `Value` is either plain data (numbers, strings, lists, insertion-ordered
//! maps), a nested [`Container`] layer, or a [`Function`] waiting to be
//! applied.
//!
//! # Examples
//!
//! ```
//! use liftfold::{Container, Value};
//!
//! let pair = Value::pair("a", 1);
//! assert_eq!(pair, Value::list(["a".into(), Value::from(1)]));
//!
//! let nested = Value::from(Container::just(2));
//! assert_eq!(nested.as_container(), Some(&Container::just(2)));
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::container::Container;
use crate::error::{raise, LiftError};

/// Insertion-ordered string-keyed map.
pub type Map = IndexMap<String, Value>;

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The absence of data.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// An ordered list of plain values.
    ///
    /// A list is data, not nondeterminism. Use [`Container::sequence`] for
    /// the cartesian variant.
    List(Vec<Value>),
    /// An insertion-ordered map.
    Map(Map),
    /// One more layer of effect.
    Container(Box<Container>),
    /// A function payload, as found in the left operand of `ap`.
    Function(Function),
}

impl Value {
    /// Build a list from anything convertible into values.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Build the two element `[key, value]` list used for keyed folds.
    pub fn pair(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Value::List(vec![key.into(), value.into()])
    }

    /// Build a map, keeping the order the entries are given in.
    ///
    /// ```
    /// use liftfold::Value;
    ///
    /// let map = Value::map_of([("b", 2), ("a", 1)]);
    /// let keys: Vec<_> = map.as_map().unwrap().keys().cloned().collect();
    /// assert_eq!(keys, ["b", "a"]);
    /// ```
    pub fn map_of<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Wrap a closure as a function value.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Value::Function(Function::new(f))
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Container(_) => "container",
            Value::Function(_) => "function",
        }
    }

    /// Apply a function value to `arg`.
    ///
    /// # Panics
    ///
    /// Panics with [`LiftError::NotAFunction`] if `self` is not a function.
    #[track_caller]
    pub fn call(&self, arg: Value) -> Value {
        match self {
            Value::Function(f) => f.call(arg),
            other => raise(LiftError::NotAFunction(other.type_name())),
        }
    }

    /// Integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// String payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// List payload, if any.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Map payload, if any.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Nested container, if any.
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Value::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Take the nested container out of the value, or hand the value back.
    pub fn into_container(self) -> Result<Container, Value> {
        match self {
            Value::Container(c) => Ok(*c),
            other => Err(other),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Container> for Value {
    fn from(c: Container) -> Self {
        Value::Container(Box::new(c))
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

/// A shareable `Value -> Value` function.
///
/// Two functions are equal only if they are the same allocation.
#[derive(Clone)]
pub struct Function(Arc<dyn Fn(Value) -> Value + Send + Sync>);

impl Function {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Function(Arc::new(f))
    }

    /// Apply the function.
    pub fn call(&self, arg: Value) -> Value {
        (self.0)(arg)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// Manual Debug implementation since Fn is not Debug
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<function>")
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::{Error, SerializeMap, SerializeSeq};

        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Container(c) => serde::Serialize::serialize(c.as_ref(), serializer),
            Value::Function(_) => Err(S::Error::custom("functions cannot be serialized")),
        }
    }
}
