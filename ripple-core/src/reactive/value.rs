//! Dynamic values stored in observed containers.
//!
//! Containers are heterogeneous, so every slot holds a [`Value`]. Scalars
//! are stored inline; containers are stored by handle and compared by
//! identity, never by content.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Number};

use super::object::Object;
use super::proxy::Reactive;
use super::refs::Ref;
use crate::graph::{PropertyKey, TargetId};

/// A value held by a container slot or a ref.
#[derive(Clone, Default)]
pub enum Value {
    /// The value of a slot that was never written.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),

    /// A raw container. Reads through it are not observed.
    Object(Object),

    /// An observed view of a raw container.
    Reactive(Reactive),

    /// A boxed value.
    Ref(Ref),
}

impl Value {
    /// Whether the value is object-shaped (a raw or observed container).
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Reactive(_))
    }

    /// Whether the value is an array, raw or observed.
    pub fn is_array(&self) -> bool {
        self.target_object().is_some_and(Object::is_array)
    }

    /// Whether the value is NaN.
    pub fn is_nan(&self) -> bool {
        matches!(self, Self::Number(number) if number.is_nan())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(&**text),
            _ => None,
        }
    }

    /// The observed view, if this is one.
    pub fn as_reactive(&self) -> Option<&Reactive> {
        match self {
            Self::Reactive(reactive) => Some(reactive),
            _ => None,
        }
    }

    /// The raw container, if this is one.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The ref, if this is one.
    pub fn as_ref_cell(&self) -> Option<&Ref> {
        match self {
            Self::Ref(cell) => Some(cell),
            _ => None,
        }
    }

    /// The raw container behind an object-shaped value.
    pub(crate) fn target_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            Self::Reactive(reactive) => Some(reactive.raw()),
            _ => None,
        }
    }

    /// Build a value from JSON. Arrays and objects become raw containers.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(flag) => Self::Bool(flag),
            serde_json::Value::Number(number) => Self::Number(number.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(text) => Self::from(text),
            serde_json::Value::Array(items) => {
                Self::Object(Object::from_values(items.into_iter().map(Self::from_json)))
            }
            serde_json::Value::Object(fields) => Self::Object(Object::from_entries(
                fields
                    .into_iter()
                    .map(|(name, field)| (name, Self::from_json(field))),
            )),
        }
    }

    /// Snapshot the value as JSON without observing any read.
    ///
    /// `Undefined`, non-finite numbers and cyclic references become `null`;
    /// refs are replaced by the value they hold; symbol keys are skipped.
    pub fn to_json(&self) -> serde_json::Value {
        let mut visiting = HashSet::new();
        self.to_json_inner(&mut visiting)
    }

    fn to_json_inner(&self, visiting: &mut HashSet<TargetId>) -> serde_json::Value {
        match self {
            Self::Undefined | Self::Null => serde_json::Value::Null,
            Self::Bool(flag) => serde_json::Value::Bool(*flag),
            Self::Number(number) => Number::from_f64(*number)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Str(text) => serde_json::Value::String(text.to_string()),
            Self::Ref(cell) => cell.get_untracked().to_json_inner(visiting),
            Self::Object(_) | Self::Reactive(_) => {
                let Some(object) = self.target_object() else {
                    return serde_json::Value::Null;
                };
                if !visiting.insert(object.id()) {
                    return serde_json::Value::Null;
                }

                let json = if object.is_array() {
                    serde_json::Value::Array(
                        object
                            .values()
                            .iter()
                            .map(|item| item.to_json_inner(visiting))
                            .collect(),
                    )
                } else {
                    let mut fields = Map::new();
                    for (key, field) in object.entries() {
                        if let PropertyKey::Name(name) = key {
                            fields.insert(name, field.to_json_inner(visiting));
                        }
                    }
                    serde_json::Value::Object(fields)
                };

                visiting.remove(&object.id());
                json
            }
        }
    }
}

/// Strict equality: scalars by value, containers and refs by identity.
///
/// A raw container and an observed view of it are the same target, so
/// they compare equal. As with `f64`, NaN is not equal to itself; use
/// [`has_change`] for write detection.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Ref(a), Self::Ref(b)) => a.ptr_eq(b),
            _ => match (self.target_object(), other.target_object()) {
                (Some(a), Some(b)) => a.ptr_eq(b),
                _ => false,
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Null => f.write_str("Null"),
            Self::Bool(flag) => write!(f, "Bool({flag})"),
            Self::Number(number) => write!(f, "Number({number})"),
            Self::Str(text) => write!(f, "Str({text:?})"),
            Self::Object(object) => write!(f, "Object({object:?})"),
            Self::Reactive(reactive) => write!(f, "Reactive({:?})", reactive.raw()),
            Self::Ref(cell) => write!(f, "Ref({})", cell.id()),
        }
    }
}

/// Whether a write of `new` over `old` is an actual change.
///
/// Identical values are not a change, and neither is NaN over NaN.
pub fn has_change(old: &Value, new: &Value) -> bool {
    old != new && !(old.is_nan() && new.is_nan())
}

/// Whether the value is object-shaped.
pub fn is_object(value: &Value) -> bool {
    value.is_object()
}

/// Whether the value is an array, raw or observed.
pub fn is_array(value: &Value) -> bool {
    value.is_array()
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Self::Number(f64::from(number))
    }
}

impl From<u32> for Value {
    fn from(number: u32) -> Self {
        Self::Number(f64::from(number))
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Str(Rc::from(text))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Str(Rc::from(text))
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl From<Reactive> for Value {
    fn from(reactive: Reactive) -> Self {
        Self::Reactive(reactive)
    }
}

impl From<Ref> for Value {
    fn from(cell: Ref) -> Self {
        Self::Ref(cell)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self::from_json(json)
    }
}
