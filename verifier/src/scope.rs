//! Binding scopes for matcher labels.

use soundlaw_pattern::MatcherKey;
use std::collections::HashSet;

/// A stack of binding frames tracking which (class, label) pairs are
/// in scope at the current walk position. Alternation and repetition
/// push a frame per branch; what survives the pop is decided by the
/// walker (branch intersection for alternation, pass-through for
/// repetition).
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<HashSet<MatcherKey>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![HashSet::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(HashSet::new());
    }

    pub fn pop(&mut self) -> HashSet<MatcherKey> {
        self.frames.pop().unwrap_or_default()
    }

    /// Bind a key in the innermost frame.
    pub fn bind(&mut self, key: MatcherKey) {
        if let Some(top) = self.frames.last_mut() {
            top.insert(key);
        }
    }

    /// Merge a popped frame's bindings into the innermost frame.
    pub fn extend(&mut self, keys: HashSet<MatcherKey>) {
        if let Some(top) = self.frames.last_mut() {
            top.extend(keys);
        }
    }

    /// Whether a key is bound in any enclosing frame.
    pub fn is_bound(&self, key: &MatcherKey) -> bool {
        self.frames.iter().any(|frame| frame.contains(key))
    }
}
