//! Raw containers.
//!
//! An [`Object`] is the raw, unobserved target: a record (insertion-ordered
//! map) or an array. Its accessors never track or trigger anything; wrap it
//! with [`reactive`](super::reactive) to observe it.
//!
//! Every container carries a [`TargetId`]. When the last handle to a
//! container is dropped, its dependency entries are pruned from the
//! runtime.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::runtime::Runtime;
use super::value::Value;
use crate::error::{ReactiveError, Result};
use crate::graph::{PropertyKey, Target, TargetId};

/// Largest array length, `2^32 - 1`. The largest index is one less.
pub const MAX_ARRAY_LENGTH: usize = u32::MAX as usize;

/// Storage of a container.
#[derive(Debug, Clone)]
pub enum Container {
    /// Named fields in insertion order. Index keys are stored as names.
    Record(IndexMap<PropertyKey, Value>),

    /// Ordered elements.
    Array(Vec<Value>),
}

struct ObjectInner {
    id: TargetId,
    data: RefCell<Container>,
}

impl Drop for ObjectInner {
    fn drop(&mut self) {
        Runtime::release_target(self.id);
    }
}

/// A raw record or array, shared by reference.
///
/// Cloning an `Object` creates another handle to the same container.
#[derive(Clone)]
pub struct Object {
    inner: Rc<ObjectInner>,
}

impl Object {
    fn with_container(container: Container) -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                id: TargetId::new(),
                data: RefCell::new(container),
            }),
        }
    }

    /// Create an empty record.
    pub fn record() -> Self {
        Self::with_container(Container::Record(IndexMap::new()))
    }

    /// Create an empty array.
    pub fn array() -> Self {
        Self::with_container(Container::Array(Vec::new()))
    }

    /// Create a record from `(name, value)` pairs.
    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<PropertyKey>,
        V: Into<Value>,
    {
        let fields = entries
            .into_iter()
            .map(|(key, value)| (key.into().into_record_key(), value.into()))
            .collect();
        Self::with_container(Container::Record(fields))
    }

    /// Create an array from values.
    pub fn from_values<V, I>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::with_container(Container::Array(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// Get the container's target ID.
    pub fn id(&self) -> TargetId {
        self.inner.id
    }

    /// Whether two handles refer to the same container.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether the container is an array.
    pub fn is_array(&self) -> bool {
        matches!(&*self.inner.data.borrow(), Container::Array(_))
    }

    /// Array length, or the number of fields of a record.
    pub fn len(&self) -> usize {
        match &*self.inner.data.borrow() {
            Container::Record(fields) => fields.len(),
            Container::Array(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the container has a slot for `key`.
    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        match &*self.inner.data.borrow() {
            Container::Record(fields) => fields.contains_key(&key.clone().into_record_key()),
            Container::Array(items) => {
                key.is_length() || key.as_index().is_some_and(|index| index < items.len())
            }
        }
    }

    /// Read a slot. Missing slots read as [`Value::Undefined`].
    ///
    /// On arrays, `length` reads as the element count.
    pub fn get(&self, key: &PropertyKey) -> Value {
        match &*self.inner.data.borrow() {
            Container::Record(fields) => fields
                .get(&key.clone().into_record_key())
                .cloned()
                .unwrap_or_default(),
            Container::Array(items) => {
                if key.is_length() {
                    return Value::Number(items.len() as f64);
                }
                key.as_index()
                    .and_then(|index| items.get(index))
                    .cloned()
                    .unwrap_or_default()
            }
        }
    }

    /// Write a slot and return what it held before.
    ///
    /// Writing past the end of an array grows it, filling the gap with
    /// [`Value::Undefined`]. Writing `length` grows or truncates it.
    /// Lengths above [`MAX_ARRAY_LENGTH`] are rejected, as are growths the
    /// allocator refuses.
    pub fn set(&self, key: &PropertyKey, value: Value) -> Result<Value> {
        let id = self.id();
        let mut data = self.inner.data.borrow_mut();

        match &mut *data {
            Container::Record(fields) => Ok(fields
                .insert(key.clone().into_record_key(), value)
                .unwrap_or_default()),
            Container::Array(items) => {
                if key.is_length() {
                    let length = array_length(&value)?;
                    let previous = Value::Number(items.len() as f64);
                    let removed = if length < items.len() {
                        items.split_off(length)
                    } else {
                        grow(items, length, id)?;
                        Vec::new()
                    };
                    // Released elements may be the last handle to another target.
                    drop(data);
                    drop(removed);
                    return Ok(previous);
                }

                let invalid = || ReactiveError::InvalidArrayKey {
                    target: id,
                    key: key.clone(),
                };
                let index = key.as_index().ok_or_else(invalid)?;
                let required = index
                    .checked_add(1)
                    .filter(|length| *length <= MAX_ARRAY_LENGTH)
                    .ok_or_else(invalid)?;
                if required > items.len() {
                    grow(items, required, id)?;
                }
                Ok(std::mem::replace(&mut items[index], value))
            }
        }
    }

    /// Append to an array and return the new length.
    pub fn push(&self, value: Value) -> Result<usize> {
        match &mut *self.inner.data.borrow_mut() {
            Container::Array(items) => {
                items.push(value);
                Ok(items.len())
            }
            Container::Record(_) => Err(ReactiveError::NotAnArray(self.id())),
        }
    }

    /// Keys in order: indices for arrays, field names for records.
    pub fn keys(&self) -> Vec<PropertyKey> {
        match &*self.inner.data.borrow() {
            Container::Record(fields) => fields.keys().cloned().collect(),
            Container::Array(items) => (0..items.len()).map(PropertyKey::Index).collect(),
        }
    }

    /// A snapshot of the values in order.
    pub fn values(&self) -> Vec<Value> {
        match &*self.inner.data.borrow() {
            Container::Record(fields) => fields.values().cloned().collect(),
            Container::Array(items) => items.clone(),
        }
    }

    /// A snapshot of `(key, value)` pairs in order.
    pub fn entries(&self) -> Vec<(PropertyKey, Value)> {
        match &*self.inner.data.borrow() {
            Container::Record(fields) => fields
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            Container::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, value)| (PropertyKey::Index(index), value.clone()))
                .collect(),
        }
    }

    /// A copy of the underlying storage.
    pub fn snapshot(&self) -> Container {
        self.inner.data.borrow().clone()
    }
}

/// Extend `items` to `length` with `Undefined`, failing instead of
/// aborting when the allocation is refused.
fn grow(items: &mut Vec<Value>, length: usize, target: TargetId) -> Result<()> {
    items
        .try_reserve_exact(length - items.len())
        .map_err(|_| ReactiveError::CapacityExceeded { target, length })?;
    items.resize(length, Value::Undefined);
    Ok(())
}

fn array_length(value: &Value) -> Result<usize> {
    match value {
        Value::Number(number)
            if number.is_finite()
                && *number >= 0.0
                && number.fract() == 0.0
                && *number <= MAX_ARRAY_LENGTH as f64 =>
        {
            Ok(*number as usize)
        }
        other => Err(ReactiveError::InvalidLength(format!("{other:?}"))),
    }
}

impl Target for Object {
    fn target_id(&self) -> TargetId {
        self.id()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Contents are left out: containers may reference themselves.
        let kind = if self.is_array() { "array" } else { "record" };
        write!(f, "{} {kind} len={}", self.id(), self.len())
    }
}
