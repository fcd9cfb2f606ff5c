use chrono::Utc;

use crate::config::UdfConfig;

/// Per-query context handed to scalar functions.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub config: UdfConfig,
}

impl Session {
    pub fn new(config: UdfConfig) -> Self {
        Self { config }
    }

    pub fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
