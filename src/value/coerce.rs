//! Copying decoded values into statically typed destinations.
//!
//! Destination types implement [`Coerce`]. Containers check every element,
//! key and value against the static element type before assigning it, so a
//! `Vec<f64>` never silently receives integers. [`Value`] itself accepts
//! anything and is the escape hatch for callers that want the raw result.
//!
//! Copies are not transactional: when element `i` fails, elements `0..i`
//! have already been written into the destination. Callers discard the
//! destination on error.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use bytes::Bytes;

use super::{Throwable, Value};
use crate::protocol::{Error, Result};

/// A destination type that a decoded [`Value`] can be copied into.
pub trait Coerce: Sized {
    /// Static type name used in mismatch errors
    fn type_name() -> String;

    /// Whether a value of this runtime shape is assignable to `Self`.
    ///
    /// Only the outer shape is checked; nested elements are checked when
    /// the value is converted.
    fn accepts(value: &Value) -> bool;

    /// Convert an owned value.
    fn from_value(value: Value) -> Result<Self>;

    /// Overwrite `self` with `value`.
    fn coerce_into(&mut self, value: Value) -> Result<()> {
        *self = Self::from_value(value)?;
        Ok(())
    }
}

/// Copy `decoded` into `destination`.
///
/// # Errors
///
/// Returns [`Error::NilInput`] when `decoded` is `Null` and
/// [`Error::TypeMismatch`] when its shape does not fit the destination.
pub fn coerce<T: Coerce>(decoded: Value, destination: &mut T) -> Result<()> {
    if decoded.is_null() {
        return Err(Error::NilInput {
            what: "decoded value",
        });
    }
    destination.coerce_into(decoded)
}

impl Coerce for Value {
    fn type_name() -> String {
        "any".to_owned()
    }

    fn accepts(_: &Value) -> bool {
        true
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }

    fn coerce_into(&mut self, value: Value) -> Result<()> {
        *self = value;
        Ok(())
    }
}

macro_rules! coerce_scalar {
    ($ty:ty, $name:literal, $variant:ident) => {
        impl Coerce for $ty {
            fn type_name() -> String {
                $name.to_owned()
            }

            fn accepts(value: &Value) -> bool {
                matches!(value, Value::$variant(_))
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v.into()),
                    other => Err(Error::type_mismatch($name, other.value_type(), "value")),
                }
            }
        }
    };
}

coerce_scalar!(bool, "bool", Bool);
coerce_scalar!(i32, "i32", Int);
coerce_scalar!(i64, "i64", Long);
coerce_scalar!(f64, "f64", Double);
coerce_scalar!(String, "String", String);
coerce_scalar!(Bytes, "Bytes", Binary);
coerce_scalar!(Throwable, "Throwable", Throwable);

impl<T: Coerce> Coerce for Box<T> {
    fn type_name() -> String {
        T::type_name()
    }

    fn accepts(value: &Value) -> bool {
        T::accepts(value)
    }

    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Box::new)
    }

    fn coerce_into(&mut self, value: Value) -> Result<()> {
        (**self).coerce_into(value)
    }
}

impl<T: Coerce> Coerce for Option<T> {
    fn type_name() -> String {
        format!("Option<{}>", T::type_name())
    }

    fn accepts(value: &Value) -> bool {
        value.is_null() || T::accepts(value)
    }

    fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }

    fn coerce_into(&mut self, value: Value) -> Result<()> {
        match self {
            Some(inner) if !value.is_null() => inner.coerce_into(value),
            _ => {
                *self = Self::from_value(value)?;
                Ok(())
            }
        }
    }
}

impl<E: Coerce> Coerce for Vec<E> {
    fn type_name() -> String {
        format!("Vec<{}>", E::type_name())
    }

    fn accepts(value: &Value) -> bool {
        matches!(value, Value::List(_))
    }

    fn from_value(value: Value) -> Result<Self> {
        let mut out = Vec::new();
        out.coerce_into(value)?;
        Ok(out)
    }

    fn coerce_into(&mut self, value: Value) -> Result<()> {
        let items = expect_list::<Self>(value)?;
        self.clear();
        self.reserve(items.len());
        for (index, item) in items.into_iter().enumerate() {
            check_element::<E>(&item, index)?;
            self.push(E::from_value(item)?);
        }
        Ok(())
    }
}

impl<E: Coerce, const N: usize> Coerce for [E; N] {
    fn type_name() -> String {
        format!("[{}; {N}]", E::type_name())
    }

    fn accepts(value: &Value) -> bool {
        matches!(value, Value::List(items) if items.len() == N)
    }

    fn from_value(value: Value) -> Result<Self> {
        let items = expect_list::<Self>(value)?;
        check_len::<Self>(items.len(), N)?;
        let mut out = Vec::with_capacity(N);
        for (index, item) in items.into_iter().enumerate() {
            check_element::<E>(&item, index)?;
            out.push(E::from_value(item)?);
        }
        out.try_into().map_err(|rest: Vec<E>| {
            Error::type_mismatch(Self::type_name(), format!("list of {}", rest.len()), "value")
        })
    }

    fn coerce_into(&mut self, value: Value) -> Result<()> {
        let items = expect_list::<Self>(value)?;
        check_len::<Self>(items.len(), N)?;
        for (index, (slot, item)) in self.iter_mut().zip(items).enumerate() {
            check_element::<E>(&item, index)?;
            slot.coerce_into(item)?;
        }
        Ok(())
    }
}

impl<K, V, S> Coerce for HashMap<K, V, S>
where
    K: Coerce + Eq + Hash,
    V: Coerce,
    S: BuildHasher + Default,
{
    fn type_name() -> String {
        format!("HashMap<{}, {}>", K::type_name(), V::type_name())
    }

    fn accepts(value: &Value) -> bool {
        matches!(value, Value::Map(_))
    }

    fn from_value(value: Value) -> Result<Self> {
        let mut out = Self::default();
        out.coerce_into(value)?;
        Ok(out)
    }

    fn coerce_into(&mut self, value: Value) -> Result<()> {
        let pairs = expect_map::<Self>(value)?;
        *self = Self::with_capacity_and_hasher(pairs.len(), S::default());
        for (key, value) in pairs {
            let (key, value) = coerce_entry::<K, V>(key, value)?;
            self.insert(key, value);
        }
        Ok(())
    }
}

impl<K, V> Coerce for BTreeMap<K, V>
where
    K: Coerce + Ord,
    V: Coerce,
{
    fn type_name() -> String {
        format!("BTreeMap<{}, {}>", K::type_name(), V::type_name())
    }

    fn accepts(value: &Value) -> bool {
        matches!(value, Value::Map(_))
    }

    fn from_value(value: Value) -> Result<Self> {
        let mut out = Self::new();
        out.coerce_into(value)?;
        Ok(out)
    }

    fn coerce_into(&mut self, value: Value) -> Result<()> {
        let pairs = expect_map::<Self>(value)?;
        self.clear();
        for (key, value) in pairs {
            let (key, value) = coerce_entry::<K, V>(key, value)?;
            self.insert(key, value);
        }
        Ok(())
    }
}

fn expect_list<T: Coerce>(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(Error::type_mismatch(
            T::type_name(),
            other.value_type(),
            "value",
        )),
    }
}

fn expect_map<T: Coerce>(value: Value) -> Result<Vec<(Value, Value)>> {
    match value {
        Value::Map(pairs) => Ok(pairs),
        other => Err(Error::type_mismatch(
            T::type_name(),
            other.value_type(),
            "value",
        )),
    }
}

fn check_len<T: Coerce>(len: usize, expected: usize) -> Result<()> {
    if len == expected {
        Ok(())
    } else {
        Err(Error::type_mismatch(
            T::type_name(),
            format!("list of {len}"),
            "value",
        ))
    }
}

fn check_element<E: Coerce>(item: &Value, index: usize) -> Result<()> {
    if E::accepts(item) {
        Ok(())
    } else {
        Err(Error::type_mismatch(
            E::type_name(),
            item.value_type(),
            format!("index {index}"),
        ))
    }
}

fn coerce_entry<K: Coerce, V: Coerce>(key: Value, value: Value) -> Result<(K, V)> {
    if !K::accepts(&key) {
        return Err(Error::type_mismatch(
            K::type_name(),
            key.value_type(),
            format!("key {key}"),
        ));
    }
    if !V::accepts(&value) {
        return Err(Error::type_mismatch(
            V::type_name(),
            value.value_type(),
            format!("value {value} of key {key}"),
        ));
    }
    Ok((K::from_value(key)?, V::from_value(value)?))
}
