//! Error types for glob-walker
//!
//! This module defines the error hierarchy for the engine:
//! - Pattern validation errors (caught before any I/O)
//! - Traversal errors, aggregated across worker tasks by severity
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Keep the severity classes distinct so concurrent reports from workers
//!   never downgrade a serious failure to a minor one
//! - Preserve error sources for debugging

use thiserror::Error;

/// Top-level error type for a glob query
#[derive(Error, Debug)]
pub enum GlobError {
    /// An include pattern failed validation; reported before any I/O
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    /// A stat, list, or attribute read failed with something other than
    /// "not found" during traversal
    #[error("I/O error during glob traversal: {0}")]
    Io(#[from] std::io::Error),

    /// A worker task panicked, either in the engine or in a caller-supplied
    /// predicate
    #[error("glob task panicked: {0}")]
    TaskPanic(String),

    /// The engine itself broke down (completion signaling failed, executor
    /// unable to run tasks)
    #[error("glob engine failure: {0}")]
    Engine(String),

    /// The query was canceled before completing
    #[error("glob query canceled")]
    Canceled,
}

/// Reasons an include pattern can be rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern cannot be empty")]
    Empty,

    #[error("pattern cannot be absolute")]
    Absolute,

    #[error("empty segment not permitted")]
    EmptySegment,

    #[error("segment '{0}' not permitted")]
    DotSegment(String),

    #[error("recursive wildcard must be its own segment")]
    MixedRecursive,
}

/// Result type alias for GlobError
pub type Result<T> = std::result::Result<T, GlobError>;
