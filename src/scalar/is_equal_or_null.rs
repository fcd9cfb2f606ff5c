use crate::{config::Session, scalar::{check_arity, ScalarFunction}, SqlType, SqlValue, UdfError};

/// Equality between two non-null values of the same SQL type.
pub type EqualsFn = fn(&SqlValue, &SqlValue) -> Result<bool, UdfError>;

/// The `=` operator the catalog binds for `ty`.
pub fn equality_for(ty: SqlType) -> EqualsFn {
    match (ty, ty.physical()) {
        (_, crate::PhysicalType::Double) => float_equals,
        (SqlType::TimeWithTimeZone | SqlType::TimestampWithTimeZone, _) => instant_equals,
        _ => value_equals,
    }
}

fn value_equals(a: &SqlValue, b: &SqlValue) -> Result<bool, UdfError> {
    if a.sql_type() != b.sql_type() {
        return Err(mismatch(a, b));
    }
    Ok(a == b)
}

// NaN is never equal to anything, unlike OrderedFloat's own Eq.
fn float_equals(a: &SqlValue, b: &SqlValue) -> Result<bool, UdfError> {
    match (a, b) {
        (SqlValue::Double(x), SqlValue::Double(y)) => Ok(x.into_inner() == y.into_inner()),
        (SqlValue::Real(x), SqlValue::Real(y)) => Ok(x.into_inner() == y.into_inner()),
        _ => Err(mismatch(a, b)),
    }
}

// Same instant in different zones is equal.
fn instant_equals(a: &SqlValue, b: &SqlValue) -> Result<bool, UdfError> {
    match (a, b) {
        (SqlValue::TimeWithTimeZone(x), SqlValue::TimeWithTimeZone(y))
        | (SqlValue::TimestampWithTimeZone(x), SqlValue::TimestampWithTimeZone(y)) => Ok(x.utc_millis() == y.utc_millis()),
        _ => Err(mismatch(a, b)),
    }
}

fn mismatch(a: &SqlValue, b: &SqlValue) -> UdfError {
    UdfError::TypeMismatch {
        expected: a.sql_type().unwrap_or(SqlType::Varchar),
        got: format!("{:?}", b),
    }
}

/// `is_equal_or_null(a, b)`: TRUE if both are NULL or both are equal.
pub struct IsEqualOrNullFunction {
    argument_types: [SqlType; 2],
    equals: EqualsFn,
}

impl IsEqualOrNullFunction {
    pub const NAME: &'static str = "is_equal_or_null";

    pub fn new(ty: SqlType, equals: EqualsFn) -> Self {
        Self { argument_types: [ty, ty], equals }
    }

    pub fn evaluate(&self, a: &SqlValue, b: &SqlValue) -> Result<bool, UdfError> {
        match (a.is_null(), b.is_null()) {
            (true, true) => Ok(true),
            (true, false) | (false, true) => Ok(false),
            (false, false) => (self.equals)(a, b),
        }
    }
}

impl ScalarFunction for IsEqualOrNullFunction {
    fn name(&self) -> &str { Self::NAME }

    fn return_type(&self) -> SqlType { SqlType::Boolean }

    fn argument_types(&self) -> &[SqlType] { &self.argument_types }

    fn invoke(&self, args: &[SqlValue], _session: &Session) -> Result<SqlValue, UdfError> {
        check_arity(Self::NAME, args, 2)?;
        self.evaluate(&args[0], &args[1]).map(SqlValue::Boolean)
    }
}
