//! Error types for formatting operations.
//!
//! None of these reach the end user: the reconciliation driver logs them and
//! carries on with whatever styling it could apply.

use std::ops::Range;

use thiserror::Error;

use crate::matcher::Category;

/// Errors that can occur while matching or styling a note.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FormatError {
    /// A category pattern failed to compile; that category is skipped.
    #[error("pattern for {category} failed to compile: {message}")]
    PatternCompile { category: Category, message: String },

    /// The regex engine gave up on a match (backtrack limit and the like).
    #[error("pattern for {category} failed while matching: {message}")]
    PatternRuntime { category: Category, message: String },

    /// A match lacked a capture group its style rule needs.
    #[error("{category} match at {at} is missing capture {group}")]
    InvalidCapture {
        category: Category,
        at: usize,
        group: usize,
    },

    /// A range fell outside the buffer.
    #[error("range {range:?} out of bounds for length {len}")]
    OutOfBounds { range: Range<usize>, len: usize },

    /// A reconciliation pass was requested while one was running.
    #[error("reconciliation already in progress")]
    Reentrant,
}

impl FormatError {
    pub(crate) fn compile(category: Category, err: fancy_regex::Error) -> Self {
        FormatError::PatternCompile {
            category,
            message: err.to_string(),
        }
    }

    pub(crate) fn runtime(category: Category, err: fancy_regex::Error) -> Self {
        FormatError::PatternRuntime {
            category,
            message: err.to_string(),
        }
    }
}
