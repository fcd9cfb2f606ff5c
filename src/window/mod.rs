pub mod accumulator;
pub use accumulator::*;

pub mod direction;
pub use direction::*;

pub mod frame;
pub use frame::*;

pub mod value_accessor;
pub use value_accessor::*;

pub mod ignore_null_engine;
pub use ignore_null_engine::*;

pub mod partition;
pub use partition::*;

pub mod window_function;
pub use window_function::*;

pub mod binding;
pub use binding::*;

pub mod window_driver;
pub use window_driver::*;
