use std::{fmt::Display, sync::Arc};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::{
    config::Session,
    scalar::{equality_for, DateDiffFunction, IsEqualOrNullFunction, IsNullFunction, ScalarFunction, UnixTimestampFunction},
    window::{BindingConfig, WindowFunction},
    SqlType, SqlValue, UdfError,
};

/// Builds a window function for the given argument channels.
pub type WindowFactory = Arc<dyn Fn(&[usize]) -> Result<Box<dyn WindowFunction>, UdfError> + Send + Sync>;

/// Lowercase function name plus argument types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub name: String,
    pub argument_types: Vec<SqlType>,
}

impl Signature {
    pub fn new(name: &str, argument_types: &[SqlType]) -> Self {
        Self { name: name.to_ascii_lowercase(), argument_types: argument_types.to_vec() }
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args: Vec<&str> = self.argument_types.iter().map(|t| t.sql_name()).collect();
        write!(f, "{}({})", self.name, args.join(", "))
    }
}

static DEFAULT_REGISTRY: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::default_registry);

/// Case-insensitive catalog of every function this crate provides.
///
/// Window functions are stored as factories because each partition needs its
/// own instance; scalar functions are stateless and shared.
#[derive(Default)]
pub struct FunctionRegistry {
    windows: IndexMap<Signature, WindowFactory>,
    scalars: IndexMap<Signature, Arc<dyn ScalarFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self { Self::default() }

    /// The process-wide registry, populated on first use.
    pub fn global() -> &'static FunctionRegistry { &DEFAULT_REGISTRY }

    pub fn register_window_factory(&mut self, signature: Signature, factory: WindowFactory) {
        self.windows.insert(signature, factory);
    }

    /// Register a binding template; channels are filled in at instantiation.
    pub fn register_binding(&mut self, template: BindingConfig) {
        let signature = Signature::new(&template.name, &template.argument_types());
        let factory: WindowFactory = Arc::new(move |channels: &[usize]| {
            let function = template.clone().with_channels(channels).build()?;
            Ok(Box::new(function) as Box<dyn WindowFunction>)
        });
        self.register_window_factory(signature, factory);
    }

    pub fn register_scalar<I: ScalarFunction + 'static>(&mut self, impl_: I) {
        let signature = Signature::new(impl_.name(), impl_.argument_types());
        self.scalars.insert(signature, Arc::new(impl_));
    }

    pub fn window_factory(&self, name: &str, argument_types: &[SqlType]) -> Result<WindowFactory, UdfError> {
        let signature = Signature::new(name, argument_types);
        self.windows.get(&signature)
            .cloned()
            .ok_or_else(|| UdfError::FunctionNotFound(signature.to_string()))
    }

    pub fn instantiate_window(&self, name: &str, argument_types: &[SqlType], channels: &[usize]) -> Result<Box<dyn WindowFunction>, UdfError> {
        let factory = self.window_factory(name, argument_types)?;
        factory(channels)
    }

    pub fn scalar(&self, name: &str, argument_types: &[SqlType]) -> Result<Arc<dyn ScalarFunction>, UdfError> {
        let signature = Signature::new(name, argument_types);
        self.scalars.get(&signature)
            .cloned()
            .ok_or_else(|| UdfError::FunctionNotFound(signature.to_string()))
    }

    pub fn invoke_scalar(&self, name: &str, argument_types: &[SqlType], args: &[SqlValue], session: &Session) -> Result<SqlValue, UdfError> {
        self.scalar(name, argument_types)?.invoke(args, session)
    }

    /// Registered signatures, window functions first, in registration order.
    pub fn signatures(&self) -> Vec<Signature> {
        self.windows.keys().chain(self.scalars.keys()).cloned().collect()
    }

    /// Distinct function names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut v: Vec<String> = self.signatures().into_iter().map(|s| s.name).collect();
        v.sort();
        v.dedup();
        v
    }

    pub fn default_registry() -> Self {
        let mut registry = Self::new();
        for ty in SqlType::ALL {
            registry.register_binding(BindingConfig::first_non_null(ty));
            registry.register_binding(BindingConfig::last_non_null(ty));
        }
        for ty in SqlType::ALL {
            registry.register_scalar(IsNullFunction::new(ty));
            registry.register_scalar(IsEqualOrNullFunction::new(ty, equality_for(ty)));
        }
        for f in DateDiffFunction::all() {
            registry.register_scalar(f);
        }
        for f in UnixTimestampFunction::all() {
            registry.register_scalar(f);
        }
        debug!(windows = registry.windows.len(), scalars = registry.scalars.len(), "function registry populated");
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::UdfConfig,
        window::{ColumnData, FrameBounds, Partition, WindowDriver, LAST_NON_NULL_VALUE},
    };

    #[test]
    fn registry_contains_all_and_lookup_is_case_insensitive() {
        let r = FunctionRegistry::default_registry();
        assert_eq!(r.list(), vec![
            "datediff", "first_non_null_value", "is_equal_or_null", "is_null", "last_non_null_value", "unix_timestamp",
        ]);
        assert!(r.window_factory("LAST_NON_NULL_VALUE", &[SqlType::Varchar]).is_ok());
        assert!(r.scalar("DateDiff", &[SqlType::Varchar, SqlType::Date, SqlType::Date]).is_ok());
        assert!(r.scalar("unix_timestamp", &[]).is_ok());
    }

    #[test]
    fn every_overload_is_registered() {
        let r = FunctionRegistry::default_registry();
        let count = |name: &str| r.signatures().iter().filter(|s| s.name == name).count();
        assert_eq!(count("datediff"), 5);
        assert_eq!(count("unix_timestamp"), 3);
        assert_eq!(count("first_non_null_value"), SqlType::ALL.len());
        assert_eq!(count("is_equal_or_null"), SqlType::ALL.len());

        let zoned = [SqlType::Varchar, SqlType::TimestampWithTimeZone, SqlType::TimestampWithTimeZone];
        assert_eq!(r.scalar("datediff", &zoned).unwrap().return_type(), SqlType::Bigint);
        assert!(r.window_factory("last_non_null_value", &[SqlType::TimeWithTimeZone]).is_ok());
    }

    #[test]
    fn unknown_signature_is_reported() {
        let r = FunctionRegistry::default_registry();
        let err = r.scalar("datediff", &[SqlType::Varchar, SqlType::Bigint, SqlType::Bigint]).err().unwrap();
        assert_eq!(err, UdfError::FunctionNotFound("datediff(varchar, bigint, bigint)".into()));
        assert!(matches!(r.instantiate_window("nth_value", &[SqlType::Bigint], &[0]), Err(UdfError::FunctionNotFound(_))));
    }

    #[test]
    fn factory_and_direct_construction_agree() {
        let r = FunctionRegistry::global();
        for ty in SqlType::ALL {
            let via_factory = r.instantiate_window(LAST_NON_NULL_VALUE, &[ty], &[0]).unwrap();
            let direct = BindingConfig::last_non_null(ty).with_channels(&[0]).build().unwrap();
            assert_eq!(via_factory.name(), direct.name());
            assert_eq!(via_factory.return_type(), direct.return_type());
            assert_eq!(via_factory.argument_types(), direct.argument_types());
        }
    }

    #[test]
    fn factory_rejects_wrong_channel_count() {
        let r = FunctionRegistry::global();
        let err = r.instantiate_window("first_non_null_value", &[SqlType::Double], &[]).err().unwrap();
        assert!(matches!(err, UdfError::ChannelMismatch { expected: 1, got: 0, .. }));
    }

    #[test]
    fn window_through_the_registry() {
        let r = FunctionRegistry::global();
        let p = Partition::new(vec![
            ColumnData::bigint(vec![Some(0), Some(1), Some(2)]),
            ColumnData::varchar(vec![Some("a"), None, None]),
        ]).unwrap();
        let mut f = r.instantiate_window(LAST_NON_NULL_VALUE, &[SqlType::Varchar], &[1]).unwrap();
        let out = WindowDriver::run_partition(f.as_mut(), &p, &FrameBounds::default()).unwrap();
        assert_eq!(out.to_values(), vec![SqlValue::varchar("a"); 3]);
    }

    #[test]
    fn scalars_through_the_registry() {
        let r = FunctionRegistry::global();
        let s = Session::new(UdfConfig::new());
        let t = [SqlType::Bigint];
        assert_eq!(r.invoke_scalar("is_null", &t, &[SqlValue::Null], &s).unwrap(), SqlValue::Boolean(true));
        assert_eq!(r.invoke_scalar("is_null", &t, &[SqlValue::Bigint(5)], &s).unwrap(), SqlValue::Boolean(false));

        let tt = [SqlType::Bigint, SqlType::Bigint];
        let eq = |a: SqlValue, b: SqlValue| r.invoke_scalar("is_equal_or_null", &tt, &[a, b], &s).unwrap();
        assert_eq!(eq(SqlValue::Null, SqlValue::Null), SqlValue::Boolean(true));
        assert_eq!(eq(SqlValue::Null, SqlValue::Bigint(5)), SqlValue::Boolean(false));
        assert_eq!(eq(SqlValue::Bigint(5), SqlValue::Bigint(5)), SqlValue::Boolean(true));
        assert_eq!(eq(SqlValue::Bigint(5), SqlValue::Bigint(6)), SqlValue::Boolean(false));

        let dd = [SqlType::Varchar, SqlType::Date, SqlType::Date];
        let args = [SqlValue::varchar("fortnight"), SqlValue::Date(0), SqlValue::Date(14)];
        assert!(matches!(r.invoke_scalar("datediff", &dd, &args, &s), Err(UdfError::InvalidArgument(_))));
    }
}
