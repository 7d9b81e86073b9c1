//! Soundlaw Pattern
//!
//! The typed representation of match-strings and the backtracking
//! matcher that aligns them against words.
//!
//! Responsibilities:
//! - Pattern AST (literals, matchers, alternation, repetition,
//!   boundary markers)
//! - Word model (the mutable segment sequence rules rewrite)
//! - Per-attempt capture table binding matcher labels to phonemes
//! - Direction-agnostic backtracking matcher with environment support

mod ast;
mod capture;
mod eval;
mod matcher;
mod word;

pub use ast::{
    Alternation, CharMatcher, Comparator, Constraint, MatcherBody, MatcherKey, Operand, Pattern,
    PatternElem, Repeat,
};
pub use capture::{Binding, Bound, Capture};
pub use eval::{constraint_satisfied, eval_operand};
pub use matcher::{Direction, Matcher};
pub use word::{segment_spec, Segment, Word};
