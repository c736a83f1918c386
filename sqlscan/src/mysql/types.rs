//! Conversions between sqlscan values and mysql_async values

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql_async::Value as MySqlValue;

/// Convert a bound parameter to the driver's representation.
pub fn to_mysql_value(value: &Value) -> MySqlValue {
    match value {
        Value::Null => MySqlValue::NULL,
        Value::Bool(v) => MySqlValue::from(*v),
        Value::I8(v) => MySqlValue::from(*v),
        Value::I16(v) => MySqlValue::from(*v),
        Value::I32(v) => MySqlValue::from(*v),
        Value::I64(v) => MySqlValue::from(*v),
        Value::U8(v) => MySqlValue::from(*v),
        Value::U16(v) => MySqlValue::from(*v),
        Value::U32(v) => MySqlValue::from(*v),
        Value::U64(v) => MySqlValue::from(*v),
        Value::F32(v) => MySqlValue::from(*v),
        Value::F64(v) => MySqlValue::from(*v),
        Value::String(v) => MySqlValue::from(v.as_str()),
        Value::Bytes(v) => MySqlValue::from(v.as_slice()),
        Value::Date(v) => datetime_value(v.and_time(NaiveTime::MIN)),
        Value::DateTime(v) => datetime_value(*v),
        Value::Time(v) => MySqlValue::Time(
            false,
            0,
            v.hour() as u8,
            v.minute() as u8,
            v.second() as u8,
            v.nanosecond() / 1000,
        ),
        Value::Decimal(v) => MySqlValue::from(v.to_string()),
        Value::Json(v) => MySqlValue::from(v.to_string()),
    }
}

fn datetime_value(v: NaiveDateTime) -> MySqlValue {
    MySqlValue::Date(
        v.year() as u16,
        v.month() as u8,
        v.day() as u8,
        v.hour() as u8,
        v.minute() as u8,
        v.second() as u8,
        v.and_utc().timestamp_subsec_micros(),
    )
}

/// Convert a column value from the driver into a sqlscan value.
///
/// Text comes back as bytes from the text protocol; valid UTF-8 is treated
/// as a string, anything else stays binary.
pub fn from_mysql_value(value: MySqlValue) -> Result<Value> {
    match value {
        MySqlValue::NULL => Ok(Value::Null),
        MySqlValue::Bytes(v) => Ok(match String::from_utf8(v) {
            Ok(s) => Value::String(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        }),
        MySqlValue::Int(v) => Ok(Value::I64(v)),
        MySqlValue::UInt(v) => Ok(Value::U64(v)),
        MySqlValue::Float(v) => Ok(Value::F32(v)),
        MySqlValue::Double(v) => Ok(Value::F64(v)),
        MySqlValue::Date(year, month, day, hour, min, sec, micro) => {
            let date = NaiveDate::from_ymd_opt(year.into(), month.into(), day.into())
                .ok_or_else(|| Error::Decode {
                    expected: "date",
                    actual: format!("{}-{}-{}", year, month, day),
                })?;
            if (hour, min, sec, micro) == (0, 0, 0, 0) {
                return Ok(Value::Date(date));
            }
            let time = decode_time(hour, min, sec, micro)?;
            Ok(Value::DateTime(NaiveDateTime::new(date, time)))
        }
        MySqlValue::Time(is_neg, days, hours, mins, secs, micro) => {
            // NaiveTime only covers a single non-negative day
            if is_neg || days > 0 || hours >= 24 {
                return Err(Error::Decode {
                    expected: "time (00:00:00 to 23:59:59)",
                    actual: format!(
                        "{}{}:{:02}:{:02}",
                        if is_neg { "-" } else { "" },
                        days * 24 + u32::from(hours),
                        mins,
                        secs
                    ),
                });
            }
            Ok(Value::Time(decode_time(hours, mins, secs, micro)?))
        }
    }
}

fn decode_time(hour: u8, min: u8, sec: u8, micro: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_micro_opt(hour.into(), min.into(), sec.into(), micro).ok_or_else(|| {
        Error::Decode {
            expected: "time",
            actual: format!("{}:{}:{}.{}", hour, min, sec, micro),
        }
    })
}
