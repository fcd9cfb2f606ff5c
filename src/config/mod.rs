pub mod session_time_zone;
pub use session_time_zone::*;

pub mod udf_config;
pub use udf_config::*;

pub mod session;
pub use session::*;
