//! The backtracking pattern matcher.
//!
//! One direction-agnostic algorithm serves both left-to-right and
//! right-to-left scans: the scan cursor walks the word forward or
//! backward, and pattern elements are taken in scan order (reversed
//! sequences for backward scans, recursively inside alternation and
//! repetition).
//!
//! Matching is continuation-passing: alternation and repetition commit
//! to a branch only if the continuation (the rest of the pattern, and
//! ultimately the rule's environment) also succeeds, with the capture
//! table rolled back between attempts.

use crate::ast::{CharMatcher, MatcherBody, PatternElem, Repeat};
use crate::capture::{Binding, Capture};
use crate::eval::constraint_satisfied;
use crate::word::{segment_spec, Segment};
use soundlaw_core::FeatureId;
use soundlaw_registry::{PhonemeSpec, Registry};

/// Scan direction through the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Continuation invoked with the cursor position after the pattern so
/// far; returns whether the whole attempt succeeds from there.
pub type Cont<'c, 'a> = &'c mut dyn FnMut(usize, &mut Capture<'a>) -> bool;

/// Aligns patterns against a word at a position, forward or backward.
pub struct Matcher<'a> {
    registry: &'a Registry,
    word: &'a [Segment],
}

impl<'a> Matcher<'a> {
    pub fn new(registry: &'a Registry, word: &'a [Segment]) -> Self {
        Self { registry, word }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn word(&self) -> &'a [Segment] {
        self.word
    }

    /// Match a whole pattern with a trivial continuation, returning
    /// the cursor position after the match.
    pub fn match_pattern(
        &self,
        pattern: &[PatternElem],
        pos: usize,
        dir: Direction,
        cap: &mut Capture<'a>,
    ) -> Option<usize> {
        let mut end = None;
        let matched = self.match_elems(pattern, pos, dir, cap, &mut |p, _| {
            end = Some(p);
            true
        });
        if matched {
            end
        } else {
            None
        }
    }

    /// Match pattern elements in scan order starting at `pos`, calling
    /// the continuation at the end of the sequence.
    pub fn match_elems(
        &self,
        pattern: &[PatternElem],
        pos: usize,
        dir: Direction,
        cap: &mut Capture<'a>,
        cont: Cont<'_, 'a>,
    ) -> bool {
        let split = match dir {
            Direction::Ltr => pattern.split_first(),
            Direction::Rtl => pattern.split_last(),
        };
        let Some((elem, rest)) = split else {
            return cont(pos, cap);
        };
        match elem {
            PatternElem::Symbol(name) => match self.advance(pos, dir) {
                Some((next, Segment::Symbol(s))) if s == name => {
                    self.match_elems(rest, next, dir, cap, cont)
                }
                _ => false,
            },
            PatternElem::Boundary => {
                // End-of-word satisfies a boundary element without
                // consuming anything; an explicit boundary segment is
                // consumed.
                if self.at_edge(pos, dir) {
                    return self.match_elems(rest, pos, dir, cap, cont);
                }
                match self.advance(pos, dir) {
                    Some((next, Segment::Boundary)) => self.match_elems(rest, next, dir, cap, cont),
                    _ => false,
                }
            }
            PatternElem::Spec(spec) => match self.advance(pos, dir) {
                Some((next, seg)) => match segment_spec(self.registry, seg) {
                    Some(bound) if self.registry.feature_equal(bound.spec(), spec) => {
                        self.match_elems(rest, next, dir, cap, cont)
                    }
                    _ => false,
                },
                None => false,
            },
            PatternElem::Matcher(matcher) => self.match_matcher(matcher, rest, pos, dir, cap, cont),
            PatternElem::Alternation(alt) => {
                for option in &alt.options {
                    let snapshot = cap.clone();
                    let matched = self.match_elems(option, pos, dir, cap, &mut |p, cap| {
                        self.match_elems(rest, p, dir, cap, &mut *cont)
                    });
                    if matched {
                        return true;
                    }
                    *cap = snapshot;
                }
                false
            }
            PatternElem::Repeat(rep) => self.match_repeat(rep, 0, rest, pos, dir, cap, cont),
        }
    }

    fn match_matcher(
        &self,
        matcher: &CharMatcher,
        rest: &[PatternElem],
        pos: usize,
        dir: Direction,
        cap: &mut Capture<'a>,
        cont: Cont<'_, 'a>,
    ) -> bool {
        let Some((next, seg)) = self.advance(pos, dir) else {
            return false;
        };
        let Some(bound) = segment_spec(self.registry, seg) else {
            return false;
        };
        let Some(index) = self.admits(matcher, bound.spec(), cap) else {
            return false;
        };
        // Unlabelled matchers are unconstrained single uses: they
        // neither bind nor re-check the capture table.
        let key = matcher.key();
        let inserted = if matcher.label == 0 {
            false
        } else {
            match cap.get(&key) {
                None => {
                    cap.insert(key, Binding { bound, index });
                    true
                }
                Some(prev) => {
                    // Consistency: a re-used label must agree with the
                    // remembered phoneme on every feature the current
                    // matcher does not explicitly constrain.
                    if !self.consistent(matcher, bound.spec(), prev.bound.spec()) {
                        return false;
                    }
                    false
                }
            }
        };
        if self.match_elems(rest, next, dir, cap, cont) {
            true
        } else {
            if inserted {
                cap.remove(&key);
            }
            false
        }
    }

    /// Greedy repetition: try one more copy first, give copies back
    /// down to `min` when the continuation fails.
    fn match_repeat(
        &self,
        rep: &Repeat,
        count: usize,
        rest: &[PatternElem],
        pos: usize,
        dir: Direction,
        cap: &mut Capture<'a>,
        cont: Cont<'_, 'a>,
    ) -> bool {
        if rep.max.map_or(true, |max| count < max) {
            let snapshot = cap.clone();
            let matched = self.match_elems(&rep.pattern, pos, dir, cap, &mut |p, cap| {
                // A copy that consumes nothing cannot make progress.
                p != pos && self.match_repeat(rep, count + 1, rest, p, dir, cap, &mut *cont)
            });
            if matched {
                return true;
            }
            *cap = snapshot;
        }
        if count >= rep.min {
            return self.match_elems(rest, pos, dir, cap, cont);
        }
        false
    }

    /// Whether a matcher admits a phoneme: class restriction, then
    /// constraints or enumeration membership. Returns the enumeration
    /// index when the body enumerates.
    fn admits(
        &self,
        matcher: &CharMatcher,
        spec: &PhonemeSpec,
        cap: &Capture<'a>,
    ) -> Option<Option<usize>> {
        if let Some(class) = matcher.class {
            if !spec.has_class(class) {
                return None;
            }
        }
        match &matcher.body {
            MatcherBody::Constraints(constraints) => {
                for con in constraints {
                    let value = self.registry.feature_value(spec, con.feature);
                    if !constraint_satisfied(self.registry, con, value, cap) {
                        return None;
                    }
                }
                Some(None)
            }
            MatcherBody::Enumeration(names) => names.iter().enumerate().find_map(|(i, name)| {
                let candidate = self.registry.phoneme(name)?;
                self.registry
                    .feature_equal(spec, candidate)
                    .then_some(Some(i))
            }),
        }
    }

    fn consistent(&self, matcher: &CharMatcher, new: &PhonemeSpec, prev: &PhonemeSpec) -> bool {
        (0..self.registry.feature_count()).all(|i| {
            let id = FeatureId::new(i);
            matcher.constrains(id)
                || self.registry.feature_value(new, id) == self.registry.feature_value(prev, id)
        })
    }

    fn at_edge(&self, pos: usize, dir: Direction) -> bool {
        match dir {
            Direction::Ltr => pos == self.word.len(),
            Direction::Rtl => pos == 0,
        }
    }

    /// The next segment in scan order, with the cursor position past
    /// it.
    fn advance(&self, pos: usize, dir: Direction) -> Option<(usize, &'a Segment)> {
        match dir {
            Direction::Ltr => self.word.get(pos).map(|seg| (pos + 1, seg)),
            Direction::Rtl => {
                if pos == 0 {
                    None
                } else {
                    Some((pos - 1, &self.word[pos - 1]))
                }
            }
        }
    }
}
