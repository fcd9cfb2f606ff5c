use std::fmt::Display;

use crate::{SqlType, UdfError};

/// Calendar field addressed by the unit argument of `datediff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeUnit {
    pub fn name(&self) -> &'static str {
        match self {
            TimeUnit::Millisecond => "millisecond",
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Quarter => "quarter",
            TimeUnit::Year => "year",
        }
    }

    /// Fixed length in milliseconds of the units measured on elapsed time.
    pub fn fixed_millis(&self) -> Option<i64> {
        match self {
            TimeUnit::Millisecond => Some(1),
            TimeUnit::Second => Some(1_000),
            TimeUnit::Minute => Some(60_000),
            TimeUnit::Hour => Some(3_600_000),
            TimeUnit::Day => Some(86_400_000),
            TimeUnit::Week => Some(7 * 86_400_000),
            _ => None,
        }
    }

    /// Units `datediff` accepts for arguments of type `ty`.
    pub fn applicable_to(ty: SqlType) -> &'static [TimeUnit] {
        use TimeUnit::*;
        match ty {
            SqlType::Date => &[Day, Week, Month, Quarter, Year],
            SqlType::Time | SqlType::TimeWithTimeZone => &[Millisecond, Second, Minute, Hour],
            SqlType::Timestamp | SqlType::TimestampWithTimeZone =>
                &[Millisecond, Second, Minute, Hour, Day, Week, Month, Quarter, Year],
            _ => &[],
        }
    }

    /// Case-insensitive lookup of `unit` among the units valid for `ty`.
    pub fn for_type(unit: &str, ty: SqlType) -> Result<TimeUnit, UdfError> {
        let lunit = unit.to_lowercase();
        Self::applicable_to(ty).iter()
            .copied()
            .find(|u| u.name() == lunit)
            .ok_or_else(|| UdfError::InvalidArgument(format!("'{}' is not a valid {} field", lunit, ty.sql_name().to_uppercase())))
    }
}

impl Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
