pub mod function_registry;
pub use function_registry::*;
