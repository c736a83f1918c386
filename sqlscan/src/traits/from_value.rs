//! FromValue trait for decoding column values into Rust types

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// Trait for types that a result column can be decoded into.
///
/// Implemented for the common scalar types; implement it by hand for
/// custom column types (e.g. enums stored as strings).
pub trait FromValue: Sized {
    /// Convert a database value to this type.
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: &'static str, value: &Value) -> Error {
    Error::Decode {
        expected,
        actual: value.type_name().to_string(),
    }
}

fn out_of_range(expected: &'static str, value: &Value) -> Error {
    Error::Decode {
        expected,
        actual: format!("{value:?} out of range"),
    }
}

// Drivers frequently widen integer columns (MySQL returns BIGINT for most of
// them), so every integer target accepts every integer variant that fits.
macro_rules! from_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    let expected = stringify!($ty);
                    let converted = match value {
                        Value::I8(v) => <$ty>::try_from(v).ok(),
                        Value::I16(v) => <$ty>::try_from(v).ok(),
                        Value::I32(v) => <$ty>::try_from(v).ok(),
                        Value::I64(v) => <$ty>::try_from(v).ok(),
                        Value::U8(v) => <$ty>::try_from(v).ok(),
                        Value::U16(v) => <$ty>::try_from(v).ok(),
                        Value::U32(v) => <$ty>::try_from(v).ok(),
                        Value::U64(v) => <$ty>::try_from(v).ok(),
                        _ => return Err(mismatch(expected, &value)),
                    };
                    converted.ok_or_else(|| out_of_range(expected, &value))
                }
            }
        )*
    };
}

from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            ref other => other
                .as_i64()
                .map(|v| v != 0)
                .ok_or_else(|| mismatch("bool", other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F32(v) => Ok(v),
            Value::F64(v) => Ok(v as f32),
            _ => Err(mismatch("f32", &value)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F32(v) => Ok(v.into()),
            Value::F64(v) => Ok(v),
            Value::Decimal(v) => v
                .to_string()
                .parse()
                .map_err(|_| mismatch("f64", &Value::Decimal(v))),
            _ => Err(mismatch("f64", &value)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v),
            Value::Bytes(v) => String::from_utf8(v).map_err(|e| Error::Decode {
                expected: "utf8 string",
                actual: format!("invalid utf8: {}", e),
            }),
            _ => Err(mismatch("string", &value)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::String(v) => Ok(v.into_bytes()),
            _ => Err(mismatch("bytes", &value)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(v) => Ok(v),
            Value::DateTime(v) => Ok(v.date()),
            _ => Err(mismatch("date", &value)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(v) => Ok(v),
            Value::Date(v) => Ok(v.and_time(NaiveTime::MIN)),
            _ => Err(mismatch("datetime", &value)),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(v) => Ok(v),
            Value::DateTime(v) => Ok(v.time()),
            _ => Err(mismatch("time", &value)),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::String(ref v) => v.parse().map_err(|_| Error::Decode {
                expected: "decimal",
                actual: format!("invalid decimal string: {}", v),
            }),
            ref other => other
                .as_i64()
                .map(Decimal::from)
                .ok_or_else(|| mismatch("decimal", other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(v) => Ok(v),
            Value::String(v) => serde_json::from_str(&v).map_err(|e| Error::Decode {
                expected: "json",
                actual: format!("invalid json: {}", e),
            }),
            _ => Err(mismatch("json", &value)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(value)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_integer_widening_and_narrowing() {
        assert_eq!(i64::from_value(Value::U32(5)).unwrap(), 5);
        assert_eq!(i32::from_value(Value::I64(-3)).unwrap(), -3);
        assert_eq!(u16::from_value(Value::I64(65535)).unwrap(), 65535);
    }

    #[test]
    fn test_integer_out_of_range_is_decode_error() {
        let err = i8::from_value(Value::I64(300)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        let err = u32::from_value(Value::I64(-1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_null_into_non_option_fails() {
        let err = String::from_value(Value::Null).unwrap_err();
        assert!(err.to_string().contains("expected string, got null"));
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
    }

    #[test]
    fn test_bool_from_integer() {
        assert!(bool::from_value(Value::I8(1)).unwrap());
        assert!(!bool::from_value(Value::U64(0)).unwrap());
        assert!(bool::from_value(Value::F64(1.0)).is_err());
    }

    #[test]
    fn test_decimal_from_string() {
        let d = Decimal::from_value(Value::String("19.99".into())).unwrap();
        assert_eq!(d, Decimal::new(1999, 2));
        assert!(Decimal::from_value(Value::String("abc".into())).is_err());
    }
}
