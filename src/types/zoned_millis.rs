use std::fmt::Display;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::UdfError;

const OFFSET_BITS: u32 = 12;
const OFFSET_MASK: i64 = (1 << OFFSET_BITS) - 1;
/// Offsets are whole minutes in `[-14:00, +14:00]`.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;
/// Largest magnitude of UTC millis that survives the shift.
const MAX_UTC_MILLIS: i64 = (1 << (63 - OFFSET_BITS)) - 1;

/// A `TIME WITH TIME ZONE` or `TIMESTAMP WITH TIME ZONE` value packed into
/// one 64-bit word: UTC milliseconds in the high bits, the zone offset in the
/// low 12 bits.
///
/// Packing keeps zoned values on the long path of the window functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ZonedMillis(i64);

impl ZonedMillis {
    pub fn new(utc_millis: i64, offset: FixedOffset) -> Result<Self, UdfError> {
        let seconds = offset.local_minus_utc();
        if seconds % 60 != 0 || (seconds / 60).abs() > MAX_OFFSET_MINUTES {
            return Err(UdfError::InvalidArgument(format!("unsupported zone offset {}", offset)));
        }
        if utc_millis.abs() > MAX_UTC_MILLIS {
            return Err(UdfError::InvalidArgument(format!("instant {} out of range for a zoned value", utc_millis)));
        }
        let index = (seconds / 60 + MAX_OFFSET_MINUTES) as i64;
        Ok(Self((utc_millis << OFFSET_BITS) | index))
    }

    /// Reinterpret a packed word, rejecting offset bits no zone maps to.
    pub fn from_bits(bits: i64) -> Result<Self, UdfError> {
        if bits & OFFSET_MASK > (2 * MAX_OFFSET_MINUTES) as i64 {
            return Err(UdfError::InvalidArgument(format!("{} is not a packed zoned value", bits)));
        }
        Ok(Self(bits))
    }

    pub fn bits(&self) -> i64 { self.0 }

    pub fn utc_millis(&self) -> i64 { self.0 >> OFFSET_BITS }

    pub fn offset_minutes(&self) -> i32 { (self.0 & OFFSET_MASK) as i32 - MAX_OFFSET_MINUTES }

    pub fn offset_millis(&self) -> i64 { self.offset_minutes() as i64 * 60_000 }

    pub fn offset(&self) -> FixedOffset {
        // in range by construction
        FixedOffset::east_opt(self.offset_minutes() * 60).unwrap_or_else(|| Utc.fix())
    }
}

impl TryFrom<i64> for ZonedMillis {
    type Error = UdfError;
    fn try_from(bits: i64) -> Result<Self, Self::Error> { Self::from_bits(bits) }
}

impl From<ZonedMillis> for i64 {
    fn from(value: ZonedMillis) -> Self { value.0 }
}

impl Display for ZonedMillis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms{}", self.utc_millis(), self.offset())
    }
}
