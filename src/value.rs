//! A dynamically typed dependency.
//!
//! `Value` mirrors loosely typed data: scalars are plain values, lists and maps are shared and
//! mutable in place. This makes the difference between the two strategies observable: a strict
//! memo sees a list that was mutated in place as unchanged (same allocation), a structural memo
//! sees a freshly built list with equal contents as unchanged.
//!
//! Values must not contain cycles. Structural comparison and deep copies recurse without a
//! visited set.

use crate::dependency::{Dependency, IntoDeps};
use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<BTreeMap<String, Value>>>),
}

impl Value {
    pub fn list(values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Value::List(Rc::new(RefCell::new(
            values.into_iter().map(Into::into).collect(),
        )))
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, impl Into<Value>)>) -> Self {
        Value::Map(Rc::new(RefCell::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number of elements of a list or entries of a map.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::List(list) => Some(list.borrow().len()),
            Value::Map(map) => Some(map.borrow().len()),
            _ => None,
        }
    }

    /// Element `index` of a list, or `None` if this isn't a list or the index is out of bounds.
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Value::List(list) => list.borrow().get(index).cloned(),
            _ => None,
        }
    }

    /// Entry `key` of a map.
    pub fn get_key(&self, key: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// Appends to a shared list in place. Every clone of this value sees the change.
    ///
    /// Panics if this is not a list.
    pub fn push(&self, value: impl Into<Value>) {
        match self {
            Value::List(list) => list.borrow_mut().push(value.into()),
            _ => panic!("Cannot push to a {}", self.kind()),
        }
    }

    /// Replaces element `index` of a shared list in place and returns the previous element.
    ///
    /// Panics if this is not a list or `index` is out of bounds.
    pub fn set_index(&self, index: usize, value: impl Into<Value>) -> Value {
        match self {
            Value::List(list) => std::mem::replace(&mut list.borrow_mut()[index], value.into()),
            _ => panic!("Cannot index into a {}", self.kind()),
        }
    }

    /// Inserts into a shared map in place and returns the previous entry.
    ///
    /// Panics if this is not a map.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        match self {
            Value::Map(map) => map.borrow_mut().insert(key.into(), value.into()),
            _ => panic!("Cannot insert into a {}", self.kind()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

/// Structural equality. Unlike `f64`, `NaN` equals `NaN` here, so that a `NaN` dependency does
/// not force a recomputation on every call.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            _ => false,
        }
    }
}

impl Dependency for Value {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::List(_) | Value::Map(_), _) | (_, Value::List(_) | Value::Map(_)) => false,
            (a, b) => a == b,
        }
    }

    fn deep_clone(&self) -> Self {
        match self {
            Value::List(list) => Value::List(Rc::new(RefCell::new(list.borrow().deep_clone()))),
            Value::Map(map) => Value::Map(Rc::new(RefCell::new(map.borrow().deep_clone()))),
            scalar => scalar.clone(),
        }
    }
}

/// `Null` is no dependency at all, a list holds the dependencies, anything else is the single
/// dependency.
impl IntoDeps for Value {
    type Item = Value;

    fn into_deps(self) -> Vec<Value> {
        match self {
            Value::Null => Vec::new(),
            Value::List(list) => {
                let deps = list.borrow().clone();
                deps
            }
            single => vec![single],
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(list) => f.debug_list().entries(list.borrow().iter()).finish(),
            Value::Map(map) => f.debug_map().entries(map.borrow().iter()).finish(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(value as f64)
                }
            }
        )*
    };
}

number_from!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(values)))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
