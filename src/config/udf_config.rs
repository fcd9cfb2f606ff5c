use std::{ffi::OsString, fs};

use serde::{Deserialize, Serialize};

use crate::{config::SessionTimeZone, UdfError};

/// What `unix_timestamp` does with text it cannot parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailurePolicy {
    /// Surface `UdfError::ParseFailure` to the caller.
    Propagate,
    /// Return 0 and log a warning.
    #[default]
    LegacyZero,
}

/// Session-level configuration for the scalar functions.
///
/// - `parse_failure` decides how date parsing failures are reported.
/// - `time_zone` interprets `TIMESTAMP` values and local date strings.
/// - `timestamp_pattern` is the Java-style pattern used by the one-argument
///   `unix_timestamp(text)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UdfConfig {
    pub parse_failure: ParseFailurePolicy,
    pub time_zone: SessionTimeZone,
    pub timestamp_pattern: String,
}

impl Default for UdfConfig {
    fn default() -> Self {
        Self {
            parse_failure: Default::default(),
            time_zone: Default::default(),
            timestamp_pattern: "yyyy-MM-dd HH:mm:ss".to_string(),
        }
    }
}

impl UdfConfig {
    /// Create default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: default configuration that propagates parse failures.
    pub fn strict() -> Self {
        Self { parse_failure: ParseFailurePolicy::Propagate, ..Self::default() }
    }

    pub fn with_time_zone(mut self, time_zone: SessionTimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn with_parse_failure(mut self, policy: ParseFailurePolicy) -> Self {
        self.parse_failure = policy;
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self, UdfError> {
        serde_json::from_str(text).map_err(|e| UdfError::Config(e.to_string()))
    }

    pub fn load_from_file(file_path: &OsString) -> Result<Self, UdfError> {
        let text = fs::read_to_string(file_path)
            .map_err(|e| UdfError::Config(format!("cannot read {:?}: {}", file_path, e)))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, UdfError> {
        serde_json::to_string_pretty(self).map_err(|e| UdfError::Config(e.to_string()))
    }
}
