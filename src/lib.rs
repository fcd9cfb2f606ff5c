pub mod types;
pub use types::*;

pub mod udf_error;
pub use udf_error::*;

pub mod config;
pub use config::{Session, SessionTimeZone, UdfConfig, ParseFailurePolicy};

pub mod window;
pub mod scalar;

pub mod catalog;
pub use catalog::{FunctionRegistry, Signature};
