//! The load-time error model.
//!
//! Load-time structural errors (registry construction and rule
//! verification) are collected into `Vec<LoadError>` rather than
//! thrown, so a single pass can report every defect in a rule set.
//! Run-time matching outcomes are not errors at all; see the rule
//! crate for the one fatal run-time condition.

use crate::SourcePos;
use std::fmt;
use thiserror::Error;

/// The kind of a load-time structural error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("no such feature")]
    NoSuchFeature,

    #[error("no such instance in the feature")]
    NoSuchFeatureInstance,

    #[error("feature already exists")]
    FeatureExists,

    #[error("no such character class")]
    NoSuchClass,

    #[error("character class already exists")]
    ClassExists,

    #[error("phoneme already has a character class")]
    PhonemeAlreadyHasClass,

    #[error("no such phoneme")]
    NoSuchPhoneme,

    #[error("explicit matcher label cannot be zero")]
    ExplicitLabelZero,

    #[error("use of both unlabelled and labelled matchers in a simple rule")]
    MixedMatchers,

    #[error("word boundary is not first in a left context or last in a right context")]
    SpacesWrong,

    #[error("matcher in the output pattern was not bound by the input pattern or an environment")]
    UndefinedMatcher,

    #[error("non-core feature set by a matcher in the output pattern")]
    NonCoreFeatureSet,

    #[error("phoneme count differs from a previous enumerating matcher")]
    EnumCharCountMismatch,

    #[error("enumerating matcher reuses a previous non-enumerating matcher")]
    EnumToNonEnum,

    #[error("constraint operator other than `=` in the output pattern")]
    InvalidOperatorOmega,

    #[error("constraint with multiple operands in the output pattern")]
    MultipleInstancesOmega,

    #[error("alternation or repetition in the output pattern")]
    NonSingleCharInOmega,

    #[error("relational comparator used with an unordered feature")]
    OrderedConstraintUnorderedFeature,

    #[error("dependent constraint refers to a matcher not yet bound")]
    UndefinedDependentConstraint,
}

/// A load-time structural error: an error kind, an optional
/// human-readable detail, and an optional source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub kind: ErrorKind,
    pub detail: Option<String>,
    pub pos: Option<SourcePos>,
}

impl LoadError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            detail: None,
            pos: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn at(mut self, pos: SourcePos) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn at_opt(mut self, pos: Option<SourcePos>) -> Self {
        self.pos = pos;
        self
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        if let Some(pos) = &self.pos {
            write!(f, " at {}", pos)?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadError {}

impl From<ErrorKind> for LoadError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result type for registry construction operations.
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_with_detail_and_pos() {
        let err = LoadError::new(ErrorKind::NoSuchFeature)
            .with_detail("voice")
            .at(SourcePos::new(2, 0));
        assert_eq!(
            err.to_string(),
            "no such feature: voice at line 3, column 1"
        );
    }

    #[test]
    fn test_error_display_bare() {
        let err = LoadError::new(ErrorKind::MixedMatchers);
        assert_eq!(
            err.to_string(),
            "use of both unlabelled and labelled matchers in a simple rule"
        );
    }
}
