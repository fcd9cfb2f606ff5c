pub mod scalar_function;
pub use scalar_function::*;

pub mod time_unit;
pub use time_unit::*;

pub mod date_diff;
pub use date_diff::*;

pub mod unix_timestamp;
pub use unix_timestamp::*;

pub mod is_null;
pub use is_null::*;

pub mod is_equal_or_null;
pub use is_equal_or_null::*;
