use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Timelike};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{SqlType, UdfError, ZonedMillis};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// A single nullable SQL scalar as seen by scalar functions.
///
/// Window functions never go through this type; they read columns directly
/// through a `ValueAccessor` so primitives stay unboxed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Bigint(i64),
    Integer(i32),
    Boolean(bool),
    Date(i32),
    Time(i64),
    Timestamp(i64),
    TimeWithTimeZone(ZonedMillis),
    TimestampWithTimeZone(ZonedMillis),
    Double(OrderedFloat<f64>),
    Real(OrderedFloat<f32>),
    Varchar(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool { matches!(self, SqlValue::Null) }

    /// Type of a non-null value. `Null` carries no type of its own.
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            SqlValue::Null => None,
            SqlValue::Bigint(_) => Some(SqlType::Bigint),
            SqlValue::Integer(_) => Some(SqlType::Integer),
            SqlValue::Boolean(_) => Some(SqlType::Boolean),
            SqlValue::Date(_) => Some(SqlType::Date),
            SqlValue::Time(_) => Some(SqlType::Time),
            SqlValue::Timestamp(_) => Some(SqlType::Timestamp),
            SqlValue::TimeWithTimeZone(_) => Some(SqlType::TimeWithTimeZone),
            SqlValue::TimestampWithTimeZone(_) => Some(SqlType::TimestampWithTimeZone),
            SqlValue::Double(_) => Some(SqlType::Double),
            SqlValue::Real(_) => Some(SqlType::Real),
            SqlValue::Varchar(_) => Some(SqlType::Varchar),
        }
    }

    pub fn double(f: f64) -> Self { SqlValue::Double(OrderedFloat(f)) }

    pub fn varchar(s: &str) -> Self { SqlValue::Varchar(s.to_string()) }

    pub fn date(year: i32, month: u32, day: u32) -> Result<Self, UdfError> {
        let d = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| UdfError::InvalidArgument(format!("invalid date {year}-{month}-{day}")))?;
        Ok(SqlValue::Date(Self::days_since_epoch(d)))
    }

    pub fn days_since_epoch(d: NaiveDate) -> i32 {
        d.signed_duration_since(NaiveDate::default()).num_days() as i32
    }

    /// Render as JSON using the natural text form for temporal values.
    pub fn to_json(&self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Bigint(i) | SqlValue::Time(i) => Value::Number((*i).into()),
            SqlValue::Integer(i) => Value::Number((*i).into()),
            SqlValue::Boolean(b) => Value::Bool(*b),
            SqlValue::Date(days) => NaiveDate::default()
                .checked_add_signed(chrono::Duration::days(*days as i64))
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
            SqlValue::Timestamp(ms) => DateTime::from_timestamp_millis(*ms)
                .map(|t| Value::String(t.naive_utc().format("%Y-%m-%d %H:%M:%S%.3f").to_string()))
                .unwrap_or(Value::Null),
            SqlValue::TimeWithTimeZone(z) => {
                let local = (z.utc_millis() + z.offset_millis()).rem_euclid(MILLIS_PER_DAY);
                NaiveTime::from_num_seconds_from_midnight_opt((local / 1_000) as u32, (local % 1_000) as u32 * 1_000_000)
                    .map(|t| Value::String(format!("{}{}", t.format("%H:%M:%S%.3f"), z.offset())))
                    .unwrap_or(Value::Null)
            }
            SqlValue::TimestampWithTimeZone(z) => DateTime::from_timestamp_millis(z.utc_millis())
                .map(|t| Value::String(t.with_timezone(&z.offset()).format("%Y-%m-%d %H:%M:%S%.3f%:z").to_string()))
                .unwrap_or(Value::Null),
            SqlValue::Double(f) => serde_json::Number::from_f64(f.into_inner()).map(Value::Number).unwrap_or(Value::Null),
            SqlValue::Real(f) => serde_json::Number::from_f64(f.into_inner() as f64).map(Value::Number).unwrap_or(Value::Null),
            SqlValue::Varchar(s) => Value::String(s.clone()),
        }
    }

    /// Read a JSON value as the given SQL type. JSON null maps to `Null`.
    pub fn from_json(value: &Value, ty: SqlType) -> Result<Self, UdfError> {
        let mismatch = || UdfError::TypeMismatch { expected: ty, got: value.to_string() };
        if value.is_null() { return Ok(SqlValue::Null); }
        let v = match ty {
            SqlType::Bigint => SqlValue::Bigint(value.as_i64().ok_or_else(mismatch)?),
            SqlType::Integer => SqlValue::Integer(value.as_i64().and_then(|i| i32::try_from(i).ok()).ok_or_else(mismatch)?),
            SqlType::Boolean => SqlValue::Boolean(value.as_bool().ok_or_else(mismatch)?),
            SqlType::Double => SqlValue::double(value.as_f64().ok_or_else(mismatch)?),
            SqlType::Real => SqlValue::Real(OrderedFloat(value.as_f64().ok_or_else(mismatch)? as f32)),
            SqlType::Varchar => SqlValue::Varchar(value.as_str().ok_or_else(mismatch)?.to_string()),
            SqlType::Date => {
                let d = value.as_str()
                    .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                    .ok_or_else(mismatch)?;
                SqlValue::Date(Self::days_since_epoch(d))
            }
            SqlType::Time => match value {
                Value::Number(n) => SqlValue::Time(n.as_i64().ok_or_else(mismatch)?),
                _ => {
                    let t = value.as_str()
                        .and_then(|s| NaiveTime::parse_from_str(s, "%H:%M:%S%.f").ok())
                        .ok_or_else(mismatch)?;
                    SqlValue::Time(t.num_seconds_from_midnight() as i64 * 1_000 + (t.nanosecond() / 1_000_000) as i64)
                }
            },
            SqlType::Timestamp => match value {
                Value::Number(n) => SqlValue::Timestamp(n.as_i64().ok_or_else(mismatch)?),
                _ => {
                    let t = value.as_str()
                        .and_then(|s| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok())
                        .ok_or_else(mismatch)?;
                    SqlValue::Timestamp(t.and_utc().timestamp_millis())
                }
            },
            SqlType::TimeWithTimeZone => match value {
                Value::Number(n) => SqlValue::TimeWithTimeZone(ZonedMillis::from_bits(n.as_i64().ok_or_else(mismatch)?)?),
                _ => {
                    let text = value.as_str().ok_or_else(mismatch)?;
                    let split = text.rfind(['+', '-']).ok_or_else(mismatch)?;
                    let t = NaiveTime::parse_from_str(&text[..split], "%H:%M:%S%.f").map_err(|_| mismatch())?;
                    let offset: FixedOffset = text[split..].parse().map_err(|_| mismatch())?;
                    let local = t.num_seconds_from_midnight() as i64 * 1_000 + (t.nanosecond() / 1_000_000) as i64;
                    let utc = local - offset.local_minus_utc() as i64 * 1_000;
                    SqlValue::TimeWithTimeZone(ZonedMillis::new(utc, offset)?)
                }
            },
            SqlType::TimestampWithTimeZone => match value {
                Value::Number(n) => SqlValue::TimestampWithTimeZone(ZonedMillis::from_bits(n.as_i64().ok_or_else(mismatch)?)?),
                _ => {
                    let t = value.as_str()
                        .and_then(|s| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z").ok())
                        .ok_or_else(mismatch)?;
                    SqlValue::TimestampWithTimeZone(ZonedMillis::new(t.timestamp_millis(), *t.offset())?)
                }
            },
        };
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_has_no_type() {
        assert!(SqlValue::Null.is_null());
        assert_eq!(SqlValue::Null.sql_type(), None);
        assert_eq!(SqlValue::Bigint(5).sql_type(), Some(SqlType::Bigint));
    }

    #[test]
    fn dates_are_days_since_epoch() {
        assert_eq!(SqlValue::date(1970, 1, 2).unwrap(), SqlValue::Date(1));
        assert_eq!(SqlValue::date(1969, 12, 31).unwrap(), SqlValue::Date(-1));
        assert!(SqlValue::date(2023, 2, 29).is_err());
        assert_eq!(SqlValue::Date(19_723).to_json(), json!("2024-01-01"));
    }

    #[test]
    fn json_conversion_follows_the_bound_type() {
        assert_eq!(SqlValue::from_json(&json!(null), SqlType::Bigint).unwrap(), SqlValue::Null);
        assert_eq!(SqlValue::from_json(&json!("2024-01-01"), SqlType::Date).unwrap(), SqlValue::Date(19_723));
        assert_eq!(SqlValue::from_json(&json!("00:00:01.500"), SqlType::Time).unwrap(), SqlValue::Time(1_500));
        assert_eq!(SqlValue::from_json(&json!(1.5), SqlType::Double).unwrap(), SqlValue::double(1.5));
        let tz = SqlValue::from_json(&json!("00:30:00.000+01:00"), SqlType::TimeWithTimeZone).unwrap();
        let SqlValue::TimeWithTimeZone(z) = tz else { panic!("expected time with time zone") };
        assert_eq!(z.utc_millis(), -30 * 60_000);
        assert_eq!(z.offset_minutes(), 60);
        assert_eq!(tz.to_json(), json!("00:30:00.000+01:00"));
        assert!(matches!(
            SqlValue::from_json(&json!("x"), SqlType::Bigint),
            Err(UdfError::TypeMismatch { expected: SqlType::Bigint, .. })
        ));
    }

    #[test]
    fn zoned_timestamps_keep_their_offset() {
        let v = SqlValue::from_json(&json!("2024-03-10 01:30:00-05:00"), SqlType::TimestampWithTimeZone).unwrap();
        let SqlValue::TimestampWithTimeZone(z) = v else { panic!("expected timestamp with time zone") };
        assert_eq!(z.offset_minutes(), -300);
        assert_eq!(z.utc_millis(), 1_710_052_200_000);
        assert_eq!(v.to_json(), json!("2024-03-10 01:30:00.000-05:00"));
        assert!(SqlValue::from_json(&json!("2024-03-10 01:30:00"), SqlType::TimestampWithTimeZone).is_err());
    }
}
