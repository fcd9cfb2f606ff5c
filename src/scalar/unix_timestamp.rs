use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::{
    config::{ParseFailurePolicy, Session, SessionTimeZone},
    scalar::{check_arity, ScalarFunction},
    SqlType, SqlValue, UdfError,
};

static PATTERN_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'[^']*'|y+|M+|d+|H+|h+|m+|s+|S+|a|E+|Z+|X+|%").expect("static regex")
});

/// Translate a Java-style date pattern (`yyyy-MM-dd HH:mm:ss`) into a chrono
/// format string. Letters outside the supported set are rejected.
pub fn java_pattern_to_chrono(pattern: &str) -> Result<String, UdfError> {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut last = 0;
    for token in PATTERN_TOKEN.find_iter(pattern) {
        let literal = &pattern[last..token.start()];
        if literal.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(UdfError::InvalidArgument(format!("unsupported letters '{}' in pattern '{}'", literal, pattern)));
        }
        out.push_str(literal);
        let t = token.as_str();
        let item = match t {
            "%" => "%%",
            "yyyy" | "y" => "%Y",
            "yy" => "%y",
            "MMMM" => "%B",
            "MMM" => "%b",
            "MM" | "M" => "%m",
            "dd" | "d" => "%d",
            "HH" | "H" => "%H",
            "hh" | "h" => "%I",
            "mm" | "m" => "%M",
            "ss" | "s" => "%S",
            "SSS" => "%3f",
            "a" => "%p",
            "EEE" | "E" => "%a",
            "EEEE" => "%A",
            "Z" | "ZZ" => "%z",
            "XXX" => "%:z",
            quoted if quoted.starts_with('\'') => {
                let inner = &quoted[1..quoted.len() - 1];
                if inner.is_empty() { out.push('\''); } else { out.push_str(&inner.replace('%', "%%")); }
                ""
            }
            other => return Err(UdfError::InvalidArgument(format!("unsupported token '{}' in pattern '{}'", other, pattern))),
        };
        out.push_str(item);
        last = token.end();
    }
    let tail = &pattern[last..];
    if tail.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(UdfError::InvalidArgument(format!("unsupported letters '{}' in pattern '{}'", tail, pattern)));
    }
    out.push_str(tail);
    Ok(out)
}

/// Epoch seconds for `text` read with the Java-style `pattern` in `zone`.
/// Date-only input is taken at local midnight.
pub fn parse_epoch_seconds(text: &str, pattern: &str, zone: &SessionTimeZone) -> Result<i64, UdfError> {
    let format = java_pattern_to_chrono(pattern)?;
    let failure = || UdfError::ParseFailure { input: text.to_string(), pattern: pattern.to_string() };
    let local = match NaiveDateTime::parse_from_str(text, &format) {
        Ok(local) => local,
        Err(_) => NaiveDate::parse_from_str(text, &format).ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(failure)?,
    };
    let millis = zone.local_to_utc_millis(&local).ok_or_else(failure)?;
    Ok(millis / 1_000)
}

/// `unix_timestamp()`, `unix_timestamp(text)` and `unix_timestamp(text, pattern)`.
pub struct UnixTimestampFunction {
    argument_types: Vec<SqlType>,
}

impl UnixTimestampFunction {
    pub const NAME: &'static str = "unix_timestamp";

    pub const MAX_ARITY: usize = 2;

    pub fn new(arity: usize) -> Result<Self, UdfError> {
        if arity > Self::MAX_ARITY {
            return Err(UdfError::InvalidArgument(format!("{} takes at most {} arguments", Self::NAME, Self::MAX_ARITY)));
        }
        Ok(Self::bind(arity))
    }

    /// The zero, one and two argument forms.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=Self::MAX_ARITY).map(Self::bind)
    }

    fn bind(arity: usize) -> Self {
        Self { argument_types: vec![SqlType::Varchar; arity] }
    }

    fn apply_policy(&self, parsed: Result<i64, UdfError>, session: &Session) -> Result<i64, UdfError> {
        match (parsed, session.config.parse_failure) {
            (Err(e @ UdfError::ParseFailure { .. }), ParseFailurePolicy::LegacyZero) => {
                warn!(error = %e, "unix_timestamp parse failure replaced by 0");
                Ok(0)
            }
            (result, _) => result,
        }
    }
}

impl ScalarFunction for UnixTimestampFunction {
    fn name(&self) -> &str { Self::NAME }

    fn return_type(&self) -> SqlType { SqlType::Bigint }

    fn argument_types(&self) -> &[SqlType] { &self.argument_types }

    fn invoke(&self, args: &[SqlValue], session: &Session) -> Result<SqlValue, UdfError> {
        check_arity(Self::NAME, args, self.argument_types.len())?;
        let zone = &session.config.time_zone;
        let parsed = match args {
            [] => return Ok(SqlValue::Bigint(session.now_millis() / 1_000)),
            [SqlValue::Null] | [SqlValue::Null, _] | [_, SqlValue::Null] => return Ok(SqlValue::Null),
            [SqlValue::Varchar(text)] => parse_epoch_seconds(text, &session.config.timestamp_pattern, zone),
            [SqlValue::Varchar(text), SqlValue::Varchar(pattern)] => parse_epoch_seconds(text, pattern, zone),
            _ => {
                let other = args.iter().find(|a| !matches!(a, SqlValue::Varchar(_)));
                return Err(UdfError::TypeMismatch { expected: SqlType::Varchar, got: format!("{:?}", other) });
            }
        };
        self.apply_policy(parsed, session).map(SqlValue::Bigint)
    }
}
