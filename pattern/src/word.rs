//! The word model: the mutable segment sequence rules rewrite.

use crate::capture::Bound;
use soundlaw_registry::{PhonemeSpec, Registry};

/// One segment of a working word.
#[derive(Debug, Clone)]
pub enum Segment {
    /// A phoneme symbol, resolved through the registry on demand.
    Symbol(String),
    /// An anonymous phoneme synthesized by a rewrite for which no
    /// canonical registry entry exists.
    Spec(PhonemeSpec),
    /// An explicit word-boundary segment.
    Boundary,
}

impl Segment {
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Segment::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, Segment::Boundary)
    }
}

/// A working word: an owned, in-place rewritten sequence of segments.
pub type Word = Vec<Segment>;

/// Resolve a segment to the phoneme spec it denotes, if any.
///
/// Symbols resolve through the registry; unknown symbols get a bare
/// spec carrying only their name, so class and constraint checks see
/// defaults. Boundary segments carry no phoneme.
pub fn segment_spec<'a>(registry: &'a Registry, segment: &'a Segment) -> Option<Bound<'a>> {
    match segment {
        Segment::Symbol(name) => Some(match registry.phoneme(name) {
            Some(spec) => Bound::Borrowed(spec),
            None => Bound::Owned(PhonemeSpec::new(name)),
        }),
        Segment::Spec(spec) => Some(Bound::Borrowed(spec)),
        Segment::Boundary => None,
    }
}
