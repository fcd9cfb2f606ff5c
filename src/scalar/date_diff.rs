use chrono::{DateTime, Datelike, Months, NaiveDateTime};

use crate::{
    config::{Session, SessionTimeZone},
    scalar::{check_arity, ScalarFunction, TimeUnit},
    SqlType, SqlValue, UdfError, ZonedMillis,
};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// An instant together with the zone offset in effect for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonedInstant {
    pub utc_millis: i64,
    pub offset_millis: i64,
}

impl ZonedInstant {
    pub fn new(utc_millis: i64, offset_millis: i64) -> Self { Self { utc_millis, offset_millis } }

    pub fn utc(utc_millis: i64) -> Self { Self::new(utc_millis, 0) }

    pub fn in_zone(utc_millis: i64, zone: &SessionTimeZone) -> Result<Self, UdfError> {
        Ok(Self::new(utc_millis, zone.offset_millis_at(utc_millis)?))
    }

    /// The value's own zone; `reference` supplies the offset used for
    /// calendar fields when two zoned values are compared.
    pub fn zoned(value: ZonedMillis, reference: ZonedMillis) -> Self {
        Self::new(value.utc_millis(), reference.offset_millis())
    }

    pub fn local_millis(&self) -> Result<i64, UdfError> {
        self.utc_millis.checked_add(self.offset_millis).ok_or_else(|| out_of_range(self.utc_millis))
    }

    pub fn local_datetime(&self) -> Result<NaiveDateTime, UdfError> {
        DateTime::from_timestamp_millis(self.local_millis()?)
            .map(|t| t.naive_utc())
            .ok_or_else(|| out_of_range(self.utc_millis))
    }
}

fn out_of_range(millis: i64) -> UdfError {
    UdfError::InvalidArgument(format!("instant {} out of range", millis))
}

fn checked_diff(from: i64, to: i64) -> Result<i64, UdfError> {
    to.checked_sub(from)
        .ok_or_else(|| UdfError::InvalidArgument(format!("difference between {} and {} out of range", from, to)))
}

/// Difference between two temporal values in whole calendar units.
///
/// Sub-day units measure elapsed time between the instants. Days and weeks
/// measure local wall-clock time, so a day that lost an hour to daylight
/// saving still counts as one day. Months, quarters and years count whole
/// calendar months: adding the result to the earlier value never passes the
/// later one.
pub struct DateDiff;

impl DateDiff {
    /// `d2 - d1` for dates given as days since epoch.
    pub fn dates(unit: &str, d1: i32, d2: i32) -> Result<i64, UdfError> {
        let unit = TimeUnit::for_type(unit, SqlType::Date)?;
        Self::between(unit, ZonedInstant::utc(d1 as i64 * MILLIS_PER_DAY), ZonedInstant::utc(d2 as i64 * MILLIS_PER_DAY))
    }

    /// `t2 - t1` for times of day in milliseconds.
    pub fn times(unit: &str, t1: i64, t2: i64) -> Result<i64, UdfError> {
        let unit = TimeUnit::for_type(unit, SqlType::Time)?;
        Self::between(unit, ZonedInstant::utc(t1), ZonedInstant::utc(t2))
    }

    /// `t2 - t1` for epoch-millisecond timestamps read in `zone`.
    pub fn timestamps(unit: &str, t1: i64, t2: i64, zone: &SessionTimeZone) -> Result<i64, UdfError> {
        let unit = TimeUnit::for_type(unit, SqlType::Timestamp)?;
        Self::between(unit, ZonedInstant::in_zone(t1, zone)?, ZonedInstant::in_zone(t2, zone)?)
    }

    /// `t2 - t1` for zoned times; calendar fields follow `t1`'s offset.
    pub fn times_with_time_zone(unit: &str, t1: ZonedMillis, t2: ZonedMillis) -> Result<i64, UdfError> {
        let unit = TimeUnit::for_type(unit, SqlType::TimeWithTimeZone)?;
        Self::between(unit, ZonedInstant::zoned(t1, t1), ZonedInstant::zoned(t2, t1))
    }

    /// `t2 - t1` for zoned timestamps; calendar fields follow `t1`'s offset.
    pub fn timestamps_with_time_zone(unit: &str, t1: ZonedMillis, t2: ZonedMillis) -> Result<i64, UdfError> {
        let unit = TimeUnit::for_type(unit, SqlType::TimestampWithTimeZone)?;
        Self::between(unit, ZonedInstant::zoned(t1, t1), ZonedInstant::zoned(t2, t1))
    }

    /// `to - from` in whole `unit`s.
    pub fn between(unit: TimeUnit, from: ZonedInstant, to: ZonedInstant) -> Result<i64, UdfError> {
        match unit {
            TimeUnit::Millisecond | TimeUnit::Second | TimeUnit::Minute | TimeUnit::Hour => {
                let step = unit.fixed_millis().unwrap_or(1);
                Ok(checked_diff(from.utc_millis, to.utc_millis)? / step)
            }
            TimeUnit::Day | TimeUnit::Week => {
                let step = unit.fixed_millis().unwrap_or(MILLIS_PER_DAY);
                Ok(checked_diff(from.local_millis()?, to.local_millis()?)? / step)
            }
            TimeUnit::Month | TimeUnit::Quarter | TimeUnit::Year => {
                let months = Self::whole_months(from.local_datetime()?, to.local_datetime()?)?;
                Ok(match unit {
                    TimeUnit::Quarter => months / 3,
                    TimeUnit::Year => months / 12,
                    _ => months,
                })
            }
        }
    }

    fn whole_months(from: NaiveDateTime, to: NaiveDateTime) -> Result<i64, UdfError> {
        if to < from {
            return Self::whole_months(to, from).map(|m| -m);
        }
        let mut months = (to.year() as i64 * 12 + to.month0() as i64) - (from.year() as i64 * 12 + from.month0() as i64);
        if months > 0 {
            let shifted = u32::try_from(months).ok()
                .and_then(|m| from.checked_add_months(Months::new(m)))
                .ok_or_else(|| UdfError::InvalidArgument("month difference out of range".into()))?;
            if shifted > to {
                months -= 1;
            }
        }
        Ok(months)
    }
}

/// `datediff(unit, a, b)` bound to one temporal argument type.
pub struct DateDiffFunction {
    argument_types: [SqlType; 3],
}

impl DateDiffFunction {
    pub const NAME: &'static str = "datediff";

    /// Argument types `datediff` is defined for.
    pub const TYPES: [SqlType; 5] = [
        SqlType::Date,
        SqlType::Time,
        SqlType::TimeWithTimeZone,
        SqlType::Timestamp,
        SqlType::TimestampWithTimeZone,
    ];

    pub fn new(ty: SqlType) -> Result<Self, UdfError> {
        if !Self::TYPES.contains(&ty) {
            return Err(UdfError::InvalidArgument(format!("datediff is not defined for {}", ty)));
        }
        Ok(Self::bind(ty))
    }

    /// One binding per supported type.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::TYPES.into_iter().map(Self::bind)
    }

    fn bind(ty: SqlType) -> Self {
        Self { argument_types: [SqlType::Varchar, ty, ty] }
    }
}

impl ScalarFunction for DateDiffFunction {
    fn name(&self) -> &str { Self::NAME }

    fn return_type(&self) -> SqlType { SqlType::Bigint }

    fn argument_types(&self) -> &[SqlType] { &self.argument_types }

    fn invoke(&self, args: &[SqlValue], session: &Session) -> Result<SqlValue, UdfError> {
        check_arity(Self::NAME, args, 3)?;
        let diff = match (&args[0], &args[1], &args[2]) {
            (SqlValue::Null, _, _) | (_, SqlValue::Null, _) | (_, _, SqlValue::Null) => return Ok(SqlValue::Null),
            (SqlValue::Varchar(unit), SqlValue::Date(a), SqlValue::Date(b)) => DateDiff::dates(unit, *a, *b)?,
            (SqlValue::Varchar(unit), SqlValue::Time(a), SqlValue::Time(b)) => DateDiff::times(unit, *a, *b)?,
            (SqlValue::Varchar(unit), SqlValue::Timestamp(a), SqlValue::Timestamp(b)) =>
                DateDiff::timestamps(unit, *a, *b, &session.config.time_zone)?,
            (SqlValue::Varchar(unit), SqlValue::TimeWithTimeZone(a), SqlValue::TimeWithTimeZone(b)) =>
                DateDiff::times_with_time_zone(unit, *a, *b)?,
            (SqlValue::Varchar(unit), SqlValue::TimestampWithTimeZone(a), SqlValue::TimestampWithTimeZone(b)) =>
                DateDiff::timestamps_with_time_zone(unit, *a, *b)?,
            (_, a, _) => {
                return Err(UdfError::TypeMismatch {
                    expected: self.argument_types[1],
                    got: format!("{:?}", a),
                })
            }
        };
        Ok(SqlValue::Bigint(diff))
    }
}
