//! Property Keys
//!
//! A property key names one observable slot of a target. Records use
//! names, arrays use indices plus the `length` pseudo-property, and
//! symbolic tags are reserved for engine-internal keys.

use std::fmt;

/// Name of the array length pseudo-property.
pub const LENGTH_KEY: &str = "length";

/// Name of the single slot exposed by refs and computed values.
pub const VALUE_KEY: &str = "value";

/// A key scoped to one target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// A named property (record field, or `length` on an array).
    Name(String),

    /// An array index.
    Index(usize),

    /// A symbolic tag. These never collide with user-supplied names.
    Symbol(&'static str),
}

impl PropertyKey {
    /// The `length` key.
    pub fn length() -> Self {
        Self::Name(LENGTH_KEY.to_string())
    }

    /// The `value` key.
    pub fn value() -> Self {
        Self::Name(VALUE_KEY.to_string())
    }

    /// Whether this is the `length` key.
    pub fn is_length(&self) -> bool {
        matches!(self, Self::Name(name) if name == LENGTH_KEY)
    }

    /// Interpret the key as an array index.
    ///
    /// Names only count when they are the canonical decimal spelling of an
    /// index, so `"3"` is index 3 but `"03"` is not.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Name(name) => name
                .parse::<usize>()
                .ok()
                .filter(|index| index.to_string() == *name),
            Self::Symbol(_) => None,
        }
    }

    /// Normalize the key for use in a record, where indices are names.
    pub fn into_record_key(self) -> Self {
        match self {
            Self::Index(index) => Self::Name(index.to_string()),
            other => other,
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for PropertyKey {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl From<usize> for PropertyKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&PropertyKey> for PropertyKey {
    fn from(key: &PropertyKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
            Self::Symbol(tag) => write!(f, "Symbol({tag})"),
        }
    }
}
