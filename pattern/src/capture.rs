//! The per-attempt capture table.
//!
//! Created fresh for each match attempt at a given word position,
//! rolled back across alternation branches, discarded on failure, and
//! consumed by the rewriter on success.

use crate::ast::MatcherKey;
use soundlaw_registry::PhonemeSpec;
use std::collections::HashMap;

/// A matched phoneme: either a handle into the registry (or the word
/// being matched), or an owned spec with no canonical entry.
#[derive(Debug, Clone)]
pub enum Bound<'a> {
    Borrowed(&'a PhonemeSpec),
    Owned(PhonemeSpec),
}

impl<'a> Bound<'a> {
    pub fn spec(&self) -> &PhonemeSpec {
        match self {
            Bound::Borrowed(spec) => spec,
            Bound::Owned(spec) => spec,
        }
    }
}

/// What a matcher label is bound to: the phoneme, and for enumeration
/// matchers the index of the enumerated alternative that matched.
#[derive(Debug, Clone)]
pub struct Binding<'a> {
    pub bound: Bound<'a>,
    pub index: Option<usize>,
}

/// Ephemeral mapping from (class, label) to bound phonemes across a
/// single match attempt.
#[derive(Debug, Clone, Default)]
pub struct Capture<'a> {
    map: HashMap<MatcherKey, Binding<'a>>,
}

impl<'a> Capture<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MatcherKey) -> Option<&Binding<'a>> {
        self.map.get(key)
    }

    pub fn insert(&mut self, key: MatcherKey, binding: Binding<'a>) {
        self.map.insert(key, binding);
    }

    pub fn remove(&mut self, key: &MatcherKey) {
        self.map.remove(key);
    }

    pub fn contains(&self, key: &MatcherKey) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
