//! Rule types and the match-then-rewrite step.

use crate::error::ApplyError;
use crate::predicate::{MatchSpan, Predicate};
use crate::rewrite::synthesize;
use soundlaw_core::SourcePos;
use soundlaw_pattern::{Capture, Direction, Matcher, Pattern, Word};
use soundlaw_registry::Registry;
use std::fmt;
use std::sync::Arc;

/// The outcome of a successful rewrite: where it happened and how many
/// segments went in and out, so the driver can advance past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacement {
    pub start: usize,
    pub removed: usize,
    pub inserted: usize,
}

/// A single rewrite rule: an input pattern, an output pattern, and
/// optional disjunctive environments.
pub struct SimpleRule {
    /// Input pattern.
    pub alpha: Pattern,
    /// Output pattern.
    pub omega: Pattern,
    /// (left-context, right-context) pairs, tried in order; at least
    /// one must match around the alpha span. Empty passes trivially.
    pub envs: Vec<(Pattern, Pattern)>,
    /// Match only when no environment matches.
    pub inverted: bool,
    /// Optional boolean gate over each match.
    pub predicate: Option<Arc<dyn Predicate>>,
    /// Where the rule was declared.
    pub pos: Option<SourcePos>,
}

impl fmt::Debug for SimpleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleRule")
            .field("alpha", &self.alpha)
            .field("omega", &self.omega)
            .field("envs", &self.envs)
            .field("inverted", &self.inverted)
            .field("predicate", &self.predicate.as_ref().map(|_| "<predicate>"))
            .field("pos", &self.pos)
            .finish()
    }
}

impl SimpleRule {
    pub fn new(alpha: Pattern, omega: Pattern) -> Self {
        Self {
            alpha,
            omega,
            envs: Vec::new(),
            inverted: false,
            predicate: None,
            pos: None,
        }
    }

    pub fn env(mut self, left: Pattern, right: Pattern) -> Self {
        self.envs.push((left, right));
        self
    }

    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    pub fn with_predicate(mut self, predicate: Arc<dyn Predicate>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn at(mut self, pos: SourcePos) -> Self {
        self.pos = Some(pos);
        self
    }

    /// Attempt the rule at one word position, splicing the replacement
    /// in on success. `Ok(None)` is an ordinary non-match.
    pub fn try_replace(
        &self,
        registry: &Registry,
        word: &mut Word,
        at: usize,
        dir: Direction,
    ) -> Result<Option<Replacement>, ApplyError> {
        let (lo, hi, replacement) = {
            let matcher = Matcher::new(registry, word);
            match self.try_match(&matcher, at, dir)? {
                Some((lo, hi, capture)) => match synthesize(registry, &self.omega, &capture) {
                    Some(replacement) => (lo, hi, replacement),
                    None => return Ok(None),
                },
                None => return Ok(None),
            }
        };
        let inserted = replacement.len();
        word.splice(lo..hi, replacement);
        Ok(Some(Replacement {
            start: lo,
            removed: hi - lo,
            inserted,
        }))
    }

    /// Match alpha at a position, then environments and predicate.
    /// Environment captures stay visible to the rewriter.
    fn try_match<'a>(
        &self,
        matcher: &Matcher<'a>,
        at: usize,
        dir: Direction,
    ) -> Result<Option<(usize, usize, Capture<'a>)>, ApplyError> {
        let mut capture = Capture::new();
        let mut span = None;
        let mut predicate_error = None;
        let matched = matcher.match_elems(&self.alpha, at, dir, &mut capture, &mut |p, cap| {
            let (lo, hi) = match dir {
                Direction::Ltr => (at, p),
                Direction::Rtl => (p, at),
            };
            if self.env_matches(matcher, lo, hi, cap) == self.inverted {
                return false;
            }
            if let Some(predicate) = &self.predicate {
                match predicate.test(MatchSpan::new(lo, hi), matcher.registry(), matcher.word()) {
                    Ok(true) => {}
                    Ok(false) => return false,
                    Err(err) => {
                        predicate_error = Some(err);
                        return false;
                    }
                }
            }
            span = Some((lo, hi));
            true
        });
        if let Some(err) = predicate_error {
            return Err(err.into());
        }
        match (matched, span) {
            (true, Some((lo, hi))) => Ok(Some((lo, hi, capture))),
            _ => Ok(None),
        }
    }

    /// Whether some environment pair matches around the span. Left
    /// context scans backward from the start, right context forward
    /// from the end.
    fn env_matches<'a>(
        &self,
        matcher: &Matcher<'a>,
        lo: usize,
        hi: usize,
        capture: &mut Capture<'a>,
    ) -> bool {
        if self.envs.is_empty() {
            return true;
        }
        self.envs.iter().any(|(left, right)| {
            let snapshot = capture.clone();
            let ok = matcher
                .match_pattern(left, lo, Direction::Rtl, capture)
                .is_some()
                && matcher
                    .match_pattern(right, hi, Direction::Ltr, capture)
                    .is_some();
            if !ok {
                *capture = snapshot;
            }
            ok
        })
    }
}

/// An ordered list of simple rules tried in turn; first match wins.
#[derive(Debug)]
pub struct CompoundRule {
    pub components: Vec<SimpleRule>,
}

impl CompoundRule {
    pub fn new(components: Vec<SimpleRule>) -> Self {
        Self { components }
    }

    pub fn try_replace(
        &self,
        registry: &Registry,
        word: &mut Word,
        at: usize,
        dir: Direction,
    ) -> Result<Option<Replacement>, ApplyError> {
        for component in &self.components {
            if let Some(replacement) = component.try_replace(registry, word, at, dir)? {
                return Ok(Some(replacement));
            }
        }
        Ok(None)
    }
}

/// A rewrite rule, simple or compound.
#[derive(Debug)]
pub enum Rule {
    Simple(SimpleRule),
    Compound(CompoundRule),
}

impl Rule {
    pub fn try_replace(
        &self,
        registry: &Registry,
        word: &mut Word,
        at: usize,
        dir: Direction,
    ) -> Result<Option<Replacement>, ApplyError> {
        match self {
            Rule::Simple(rule) => rule.try_replace(registry, word, at, dir),
            Rule::Compound(rule) => rule.try_replace(registry, word, at, dir),
        }
    }

    /// All simple rules, for verification.
    pub fn simple_rules(&self) -> &[SimpleRule] {
        match self {
            Rule::Simple(rule) => std::slice::from_ref(rule),
            Rule::Compound(rule) => &rule.components,
        }
    }
}
