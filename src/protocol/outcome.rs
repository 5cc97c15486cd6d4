//! Logical response payload

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use crate::value::Value;

/// Out-of-band string metadata riding alongside a response.
pub type Attachments = BTreeMap<String, String>;

/// Exception raised by the remote call, transmitted to or received from the
/// peer. Local codec failures are [`Error`](super::Error) instead.
pub type RemoteError = Box<dyn StdError + Send + Sync>;

/// Result of a remote call: a value, an exception, or neither.
///
/// On the build side the value is a dynamic [`Value`]. On the parse side
/// `T` is the destination type the decoded result is coerced into.
pub struct Outcome<T = Value> {
    /// Result of the call; `None` is a null result
    pub value: Option<T>,
    /// Exception raised by the call; takes precedence over `value`
    pub exception: Option<RemoteError>,
    /// Attachments
    pub attachments: Attachments,
}

impl<T> Outcome<T> {
    /// Create an outcome
    pub fn new(value: Option<T>, exception: Option<RemoteError>, attachments: Attachments) -> Self {
        Self {
            value,
            exception,
            attachments,
        }
    }

    /// Outcome carrying a value
    pub fn from_value(value: T) -> Self {
        Self::new(Some(value), None, Attachments::new())
    }

    /// Outcome carrying an exception
    pub fn from_error(exception: impl Into<RemoteError>) -> Self {
        Self::new(None, Some(exception.into()), Attachments::new())
    }

    /// Add an attachment
    #[must_use]
    pub fn with_attachment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attachments.insert(key.into(), value.into());
        self
    }

    /// Check if the call raised an exception
    #[must_use]
    pub fn is_exception(&self) -> bool {
        self.exception.is_some()
    }

    /// Convert into a `Result`, treating an absent value as `None`.
    pub fn into_result(self) -> Result<Option<T>, RemoteError> {
        match self.exception {
            Some(exception) => Err(exception),
            None => Ok(self.value),
        }
    }
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Self::new(None, None, Attachments::new())
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::default(),
            Value::Throwable(t) => Self::from_error(t),
            other => Self::from_value(other),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("value", &self.value)
            .field("exception", &self.exception.as_ref().map(ToString::to_string))
            .field("attachments", &self.attachments)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Throwable;

    #[test]
    fn test_default_is_null() {
        let outcome: Outcome<i32> = Outcome::default();
        assert!(outcome.value.is_none());
        assert!(!outcome.is_exception());
        assert!(outcome.attachments.is_empty());
    }

    #[test]
    fn test_from_value_normalizes() {
        assert!(Outcome::from(Value::Null).value.is_none());
        assert!(Outcome::from(Value::Throwable(Throwable::new("x"))).is_exception());
        assert_eq!(Outcome::from(Value::Int(1)).value, Some(Value::Int(1)));
    }

    #[test]
    fn test_into_result() {
        let err = Outcome::<i32>::from_error("boom").into_result().unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(Outcome::from_value(3).into_result().unwrap(), Some(3));
    }
}
