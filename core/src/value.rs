//! Dynamically typed values exchanged with the transaction collaborator.
//!
//! Positional arguments are passed as a slice of [`Value`], and each scanned
//! row fills one [`Value`] per binding slot. [`FromValue`] copies a slot into
//! a typed field of a shape.

use compact_str::{CompactString, ToCompactString};

use crate::error::ConversionError;

/// A single SQL value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Short name of the variant, used in conversion errors.
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Blob(_) => "BLOB",
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Textual form of this value when used as an identity.
    ///
    /// Text is used as-is and integers are formatted in decimal; anything else
    /// falls back to its `Debug` representation. Returns `None` for NULL, which
    /// never identifies a row.
    pub fn ident_text(&self) -> Option<CompactString> {
        match self {
            Value::Null => None,
            Value::Text(text) => Some(CompactString::from(text.as_str())),
            Value::Integer(n) => Some(n.to_compact_string()),
            Value::Real(n) => Some(compact_str::format_compact!("{n:?}")),
            Value::Blob(bytes) => Some(compact_str::format_compact!("{bytes:?}")),
        }
    }
}

/// Converts a scanned [`Value`] into a Rust field type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

fn mismatch(expected: &'static str, value: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        found: value.kind(),
    }
}

macro_rules! impl_integer_values {
    ($($ty:ty),* $(,)?) => { $(
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, ConversionError> {
                match value {
                    Value::Integer(n) => <$ty>::try_from(*n).map_err(|_| ConversionError::OutOfRange {
                        expected: stringify!($ty),
                        value: n.to_string(),
                    }),
                    other => Err(mismatch(stringify!($ty), other)),
                }
            }
        }

        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Integer(value as i64)
            }
        }
    )* };
}

impl_integer_values!(i8, i16, i32, i64, u8, u16, u32);

impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Integer(n) => u64::try_from(*n).map_err(|_| ConversionError::OutOfRange {
                expected: "u64",
                value: n.to_string(),
            }),
            other => Err(mismatch("u64", other)),
        }
    }
}

impl FromValue for usize {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Integer(n) => usize::try_from(*n).map_err(|_| ConversionError::OutOfRange {
                expected: "usize",
                value: n.to_string(),
            }),
            other => Err(mismatch("usize", other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Real(n) => Ok(*n),
            Value::Integer(n) => Ok(*n as f64),
            other => Err(mismatch("f64", other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        f64::from_value(value).map(|n| n as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Integer(n) => Ok(*n != 0),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(text) => Ok(text.clone()),
            other => Err(mismatch("String", other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Blob(bytes) => Ok(bytes.clone()),
            Value::Text(text) => Ok(text.as_bytes().to_vec()),
            other => Err(mismatch("Vec<u8>", other)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

// -- Option<T>: NULL-aware wrapper --

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Real(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Builds a positional argument array from anything convertible into [`Value`].
///
/// ```
/// let args = quarry_core::args!["Bob", 42];
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {{
        let empty: [$crate::Value; 0] = [];
        empty
    }};
    ($($arg:expr),+ $(,)?) => {
        [$($crate::Value::from($arg)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_text_formats_integers_in_decimal() {
        assert_eq!(Value::Integer(-42).ident_text().as_deref(), Some("-42"));
        assert_eq!(Value::Text("abc".into()).ident_text().as_deref(), Some("abc"));
        assert_eq!(Value::Null.ident_text(), None);
        assert_eq!(Value::Real(1.5).ident_text().as_deref(), Some("1.5"));
    }

    #[test]
    fn null_only_converts_into_option() {
        assert_eq!(Option::<String>::from_value(&Value::Null), Ok(None));
        assert_eq!(
            String::from_value(&Value::Null),
            Err(ConversionError::TypeMismatch {
                expected: "String",
                found: "NULL"
            })
        );
    }

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(u8::from_value(&Value::Integer(255)), Ok(255));
        assert!(matches!(
            u8::from_value(&Value::Integer(256)),
            Err(ConversionError::OutOfRange { expected: "u8", .. })
        ));
        assert_eq!(bool::from_value(&Value::Integer(1)), Ok(true));
    }

    #[test]
    fn args_macro_converts_each_argument() {
        let args = args!["Bob", 7, None::<i32>];
        assert_eq!(
            args,
            [Value::Text("Bob".into()), Value::Integer(7), Value::Null]
        );
        let empty = args![];
        assert!(empty.is_empty());
    }
}
