use crate::{config::Session, SqlType, SqlValue, UdfError};

/// A stateless scalar function bound to one argument signature.
pub trait ScalarFunction: Send + Sync {
    fn name(&self) -> &str;

    fn return_type(&self) -> SqlType;

    fn argument_types(&self) -> &[SqlType];

    fn invoke(&self, args: &[SqlValue], session: &Session) -> Result<SqlValue, UdfError>;
}

pub(crate) fn check_arity(name: &str, args: &[SqlValue], expected: usize) -> Result<(), UdfError> {
    if args.len() != expected {
        return Err(UdfError::InvalidArgument(format!("{} expects {} argument(s), got {}", name, expected, args.len())));
    }
    Ok(())
}
