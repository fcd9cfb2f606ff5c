use thiserror::Error;

use crate::SqlType;

/// Errors raised while binding or evaluating a function.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UdfError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot parse '{input}' with pattern '{pattern}'")]
    ParseFailure { input: String, pattern: String },

    #[error("Frame [{start}, {end}] is outside a partition of {row_count} rows")]
    FrameOutOfBounds { start: usize, end: usize, row_count: usize },

    #[error("Channel {channel} does not exist, partition has {columns} columns")]
    ChannelOutOfRange { channel: usize, columns: usize },

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: SqlType, got: String },

    #[error("{name} takes {expected} argument channel(s), got {got}")]
    ChannelMismatch { name: String, expected: usize, got: usize },

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
