//! Dynamic value model
//!
//! [`Value`] is what a [`Decoder`](crate::serialize::Decoder) yields for each
//! body field. It carries enough runtime shape for the coercion layer to check
//! assignability against a statically typed destination.

mod coerce;

use std::fmt;

pub use coerce::{Coerce, coerce};

/// Class name used when wrapping a local error into a [`Throwable`].
pub const DEFAULT_THROWABLE_CLASS: &str = "java.lang.Throwable";

/// A dynamically typed value as carried in a response body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 64-bit float
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Opaque bytes
    Binary(Vec<u8>),
    /// Ordered sequence
    List(Vec<Value>),
    /// Key/value pairs in wire order
    Map(Vec<(Value, Value)>),
    /// Named composite with ordered fields
    Object {
        /// Class name of the composite
        class: String,
        /// Field name/value pairs
        fields: Vec<(String, Value)>,
    },
    /// Cross-language exception
    Throwable(Throwable),
}

impl Value {
    /// Runtime shape of this value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Long(_) => ValueType::Long,
            Self::Double(_) => ValueType::Double,
            Self::String(_) => ValueType::String,
            Self::Binary(_) => ValueType::Binary,
            Self::List(_) => ValueType::List,
            Self::Map(_) => ValueType::Map,
            Self::Object { class, .. } => ValueType::Object(class.clone()),
            Self::Throwable(_) => ValueType::Throwable,
        }
    }

    /// Check for the absent sentinel
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer payload, if this is an `Int`
    #[must_use]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload, if this is a `String`
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Build a map value from string pairs.
    pub fn string_map<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (Self::String(k.clone()), Self::String(v.clone())))
                .collect(),
        )
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(v)
    }
}

impl From<Throwable> for Value {
    fn from(v: Throwable) -> Self {
        Self::Throwable(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}L"),
            Self::Double(v) => write!(f, "{v:?}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Binary(v) => write!(f, "<{} bytes>", v.len()),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Self::Object { class, fields } => {
                write!(f, "{class} {{")?;
                for (i, (name, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {name}: {v}")?;
                }
                write!(f, " }}")
            }
            Self::Throwable(t) => write!(f, "{t}"),
        }
    }
}

/// Runtime shape of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// `Value::Null`
    Null,
    /// `Value::Bool`
    Bool,
    /// `Value::Int`
    Int,
    /// `Value::Long`
    Long,
    /// `Value::Double`
    Double,
    /// `Value::String`
    String,
    /// `Value::Binary`
    Binary,
    /// `Value::List`
    List,
    /// `Value::Map`
    Map,
    /// `Value::Object` with its class name
    Object(String),
    /// `Value::Throwable`
    Throwable,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::String => "string",
            Self::Binary => "binary",
            Self::List => "list",
            Self::Map => "map",
            Self::Object(class) => return write!(f, "object<{class}>"),
            Self::Throwable => "throwable",
        };
        write!(f, "{name}")
    }
}

/// Exception value understood by every peer.
///
/// An error stored in an outcome is sent as-is when it is a `Throwable`;
/// any other error is wrapped into one carrying its message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Throwable {
    class: String,
    message: String,
}

impl Throwable {
    /// Create a throwable with the default class name
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_class(DEFAULT_THROWABLE_CLASS, message)
    }

    /// Create a throwable with an explicit class name
    pub fn with_class(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
        }
    }

    /// Get class name
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Get message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class, self.message)
    }
}

impl std::error::Error for Throwable {}
