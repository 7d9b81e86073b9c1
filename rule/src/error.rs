//! Run-time errors.
//!
//! A pattern not matching is a silent outcome, not an error; the only
//! fatal run-time condition is a predicate evaluation failure, which
//! aborts the whole run.

use thiserror::Error;

/// A predicate raised an error while evaluating (as opposed to
/// returning false, which is an ordinary non-match).
#[derive(Debug, Clone, Error)]
#[error("predicate evaluation failed: {message}")]
pub struct PredicateError {
    pub message: String,
}

impl PredicateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fatal error while applying sound changes to a word.
#[derive(Debug, Clone, Error)]
pub enum ApplyError {
    #[error(transparent)]
    Predicate(#[from] PredicateError),
}
