//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors raised by profiling session lifecycle misuse.
///
/// These signal caller contract violations and are never retried
/// or swallowed internally.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("profiling session is already started")]
    AlreadyStarted,

    #[error("profiling session is already stopped")]
    AlreadyStopped,

    #[error("can't call collect when a custom collect_fn is registered")]
    CustomSink,
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,
}
