use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::UdfError;

/// How a bound SQL type is physically stored in a column.
///
/// Fixed-width types share one of the two 64-bit encodings so a single
/// accumulator can serve all of them; variable-length types are read by
/// reference from the partition storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    /// 64-bit integer bit pattern
    Long,
    /// IEEE-754 double
    Double,
    /// Variable-length UTF-8 bytes owned by the partition
    Slice,
}

/// The SQL types understood by the functions in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    Bigint,
    Integer,
    Boolean,
    /// days since 1970-01-01
    Date,
    /// milliseconds of day
    Time,
    /// milliseconds since epoch, interpreted in the session zone
    Timestamp,
    /// UTC milliseconds of day plus the value's own offset, see `ZonedMillis`
    #[serde(rename = "time with time zone")]
    TimeWithTimeZone,
    /// UTC milliseconds since epoch plus the value's own offset
    #[serde(rename = "timestamp with time zone")]
    TimestampWithTimeZone,
    Double,
    Real,
    Varchar,
}

impl SqlType {
    pub const ALL: [SqlType; 11] = [
        SqlType::Bigint,
        SqlType::Integer,
        SqlType::Boolean,
        SqlType::Date,
        SqlType::Time,
        SqlType::Timestamp,
        SqlType::TimeWithTimeZone,
        SqlType::TimestampWithTimeZone,
        SqlType::Double,
        SqlType::Real,
        SqlType::Varchar,
    ];

    pub fn physical(&self) -> PhysicalType {
        match self {
            SqlType::Bigint | SqlType::Integer | SqlType::Boolean
            | SqlType::Date | SqlType::Time | SqlType::Timestamp
            | SqlType::TimeWithTimeZone | SqlType::TimestampWithTimeZone => PhysicalType::Long,
            SqlType::Double | SqlType::Real => PhysicalType::Double,
            SqlType::Varchar => PhysicalType::Slice,
        }
    }

    pub fn sql_name(&self) -> &'static str {
        match self {
            SqlType::Bigint => "bigint",
            SqlType::Integer => "integer",
            SqlType::Boolean => "boolean",
            SqlType::Date => "date",
            SqlType::Time => "time",
            SqlType::Timestamp => "timestamp",
            SqlType::TimeWithTimeZone => "time with time zone",
            SqlType::TimestampWithTimeZone => "timestamp with time zone",
            SqlType::Double => "double",
            SqlType::Real => "real",
            SqlType::Varchar => "varchar",
        }
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sql_name())
    }
}

impl FromStr for SqlType {
    type Err = UdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lname = s.trim().to_ascii_lowercase();
        SqlType::ALL.iter()
            .copied()
            .find(|t| t.sql_name() == lname)
            .or(match lname.as_str() {
                "int" => Some(SqlType::Integer),
                "float" => Some(SqlType::Real),
                "text" | "string" => Some(SqlType::Varchar),
                "timetz" => Some(SqlType::TimeWithTimeZone),
                "timestamptz" => Some(SqlType::TimestampWithTimeZone),
                _ => None,
            })
            .ok_or_else(|| UdfError::InvalidArgument(format!("'{}' is not a known type", s)))
    }
}
