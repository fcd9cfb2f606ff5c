pub mod sql_type;
pub use sql_type::*;

pub mod sql_value;
pub use sql_value::*;

pub mod zoned_millis;
pub use zoned_millis::*;
