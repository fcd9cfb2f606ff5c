use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::UdfError;

/// Zone used to interpret `TIMESTAMP` values and to parse local date strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SessionTimeZone {
    #[default]
    Utc,
    /// The process' local zone, including its daylight-saving rules
    Local,
    Fixed(FixedOffset),
}

impl SessionTimeZone {
    /// Offset from UTC, in milliseconds, in effect at the given instant.
    pub fn offset_millis_at(&self, utc_millis: i64) -> Result<i64, UdfError> {
        let seconds = match self {
            SessionTimeZone::Utc => 0,
            SessionTimeZone::Fixed(offset) => offset.local_minus_utc(),
            SessionTimeZone::Local => {
                let utc = DateTime::from_timestamp_millis(utc_millis)
                    .ok_or_else(|| UdfError::InvalidArgument(format!("timestamp {} out of range", utc_millis)))?;
                Local.offset_from_utc_datetime(&utc.naive_utc()).fix().local_minus_utc()
            }
        };
        Ok(seconds as i64 * 1_000)
    }

    /// Resolve a wall-clock time in this zone to epoch milliseconds.
    /// Ambiguous local times pick the earlier instant; skipped ones are rejected.
    pub fn local_to_utc_millis(&self, local: &NaiveDateTime) -> Option<i64> {
        match self {
            SessionTimeZone::Utc => Some(local.and_utc().timestamp_millis()),
            SessionTimeZone::Fixed(offset) => offset.from_local_datetime(local).earliest().map(|t| t.timestamp_millis()),
            SessionTimeZone::Local => Local.from_local_datetime(local).earliest().map(|t| t.timestamp_millis()),
        }
    }
}

impl FromStr for SessionTimeZone {
    type Err = UdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" | "z" => Ok(SessionTimeZone::Utc),
            "local" => Ok(SessionTimeZone::Local),
            other => other.parse::<FixedOffset>()
                .map(SessionTimeZone::Fixed)
                .map_err(|_| UdfError::Config(format!("unknown time zone '{}'", s))),
        }
    }
}

impl TryFrom<String> for SessionTimeZone {
    type Error = UdfError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<SessionTimeZone> for String {
    fn from(value: SessionTimeZone) -> Self { value.to_string() }
}

impl Display for SessionTimeZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionTimeZone::Utc => f.write_str("utc"),
            SessionTimeZone::Local => f.write_str("local"),
            SessionTimeZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}
