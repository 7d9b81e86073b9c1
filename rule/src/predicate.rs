//! The injected predicate strategy.
//!
//! A rule may carry an optional boolean predicate that gates each
//! rewrite. Hosts inject whatever implementation they like (a scripting
//! bridge, a native closure in tests); the engine consumes only the
//! boolean contract.

use crate::error::PredicateError;
use soundlaw_pattern::Segment;
use soundlaw_registry::Registry;

/// The span of a successful match: 1-based inclusive start, exclusive
/// end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    /// Build from 0-based word offsets `lo..hi`.
    pub fn new(lo: usize, hi: usize) -> Self {
        Self {
            start: lo + 1,
            end: hi + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A boolean gate over a match. The registry lets implementations
/// resolve class membership and feature values of the matched
/// segments. Returning `Ok(false)` makes the attempt a non-match;
/// returning `Err` aborts the whole run.
pub trait Predicate: Send + Sync {
    fn test(
        &self,
        span: MatchSpan,
        registry: &Registry,
        word: &[Segment],
    ) -> Result<bool, PredicateError>;
}

impl<F> Predicate for F
where
    F: Fn(MatchSpan, &Registry, &[Segment]) -> Result<bool, PredicateError> + Send + Sync,
{
    fn test(
        &self,
        span: MatchSpan,
        registry: &Registry,
        word: &[Segment],
    ) -> Result<bool, PredicateError> {
        self(span, registry, word)
    }
}
