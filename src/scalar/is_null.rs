use crate::{config::Session, scalar::{check_arity, ScalarFunction}, SqlType, SqlValue, UdfError};

/// `is_null(x)`: TRUE if the argument is NULL.
pub struct IsNullFunction {
    argument_types: [SqlType; 1],
}

impl IsNullFunction {
    pub const NAME: &'static str = "is_null";

    pub fn new(ty: SqlType) -> Self { Self { argument_types: [ty] } }
}

impl ScalarFunction for IsNullFunction {
    fn name(&self) -> &str { Self::NAME }

    fn return_type(&self) -> SqlType { SqlType::Boolean }

    fn argument_types(&self) -> &[SqlType] { &self.argument_types }

    fn invoke(&self, args: &[SqlValue], _session: &Session) -> Result<SqlValue, UdfError> {
        check_arity(Self::NAME, args, 1)?;
        Ok(SqlValue::Boolean(args[0].is_null()))
    }
}
