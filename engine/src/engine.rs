//! The engine façade.

use crate::render::render;
use crate::split::split_word;
use soundlaw_core::{ClassId, FeatureId, LoadError, LoadResult, SourcePos};
use soundlaw_registry::{Feature, Registry};
use soundlaw_rule::{ApplyError, SoundChange};
use soundlaw_verifier::verify;

/// A phoneme inventory plus an ordered list of sound changes.
///
/// Built up through the ordered construction API, verified and
/// finalized once, then applied to any number of words.
#[derive(Debug, Default)]
pub struct Engine {
    registry: Registry,
    changes: Vec<SoundChange>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ==================== Construction ====================

    /// Register a feature with the phonemes carrying each instance.
    pub fn insert_feature(
        &mut self,
        feature: Feature,
        phonemes_by_instance: &[Vec<String>],
    ) -> LoadResult<FeatureId> {
        self.registry.insert_feature(feature, phonemes_by_instance)
    }

    /// Register a character class with its membership.
    pub fn insert_class(
        &mut self,
        name: impl Into<String>,
        members: &[String],
        pos: Option<SourcePos>,
    ) -> LoadResult<ClassId> {
        self.registry.insert_class(name, members, pos)
    }

    /// Append a sound change to the ordered rule list.
    pub fn insert_sound_change(&mut self, change: SoundChange) {
        self.changes.push(change);
    }

    /// Statically verify every registered sound change, returning all
    /// accumulated violations.
    pub fn verify(&self) -> Vec<LoadError> {
        verify(&self.registry, &self.changes)
    }

    /// Build the reverse phoneme index. Must run after the last
    /// insertion and before the first `apply`.
    pub fn finalize(&mut self) {
        self.registry.build_reverse_map();
    }

    // ==================== Application ====================

    /// Apply the full ordered rule list to one word, optionally tagged
    /// with a part of speech, and render the result back to text.
    pub fn apply(&self, text: &str, tag: Option<&str>) -> Result<String, ApplyError> {
        let mut word = split_word(&self.registry, text);
        for change in &self.changes {
            change.apply(&self.registry, &mut word, tag)?;
        }
        Ok(render(&self.registry, &word))
    }
}
