//! The Registry - the phoneme inventory with name → id lookup.

use crate::{CharClass, Feature, PhonemeSpec};
use soundlaw_core::{ClassId, ErrorKind, FeatureId, LoadError, LoadResult, SourcePos};
use std::collections::HashMap;

/// Canonical projection of a phoneme spec: class plus the effective
/// value of every core feature. Two specs are feature-equal iff their
/// keys are equal, so equality and hashing agree by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SpecKey {
    class: Option<ClassId>,
    core_values: Vec<usize>,
}

/// The phoneme registry.
///
/// Mutated only during the load phase (feature, class, and phoneme
/// insertion) and once, explicitly, by `build_reverse_map`. Read-only
/// during matching.
#[derive(Debug, Default)]
pub struct Registry {
    /// Feature definitions in insertion order; `FeatureId` indexes here.
    features: Vec<Feature>,
    /// Feature id lookup by name.
    feature_names: HashMap<String, FeatureId>,

    /// Class definitions in insertion order; `ClassId` indexes here.
    classes: Vec<CharClass>,
    /// Class id lookup by name.
    class_names: HashMap<String, ClassId>,

    /// Phoneme specs by symbol name.
    phonemes: HashMap<String, PhonemeSpec>,
    /// Phoneme names in insertion order, for deterministic reverse
    /// lookups.
    phoneme_order: Vec<String>,

    /// Reverse index from canonical core-feature vectors to phoneme
    /// names, built once by `build_reverse_map`.
    reverse: HashMap<SpecKey, Vec<String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Load phase ====================

    /// Register a feature together with the phonemes carrying each of
    /// its instances. `phonemes_by_instance[i]` lists the phonemes
    /// whose value for this feature is instance `i`; phonemes not
    /// listed keep the feature's default.
    pub fn insert_feature(
        &mut self,
        feature: Feature,
        phonemes_by_instance: &[Vec<String>],
    ) -> LoadResult<FeatureId> {
        if let Some(&existing) = self.feature_names.get(&feature.name) {
            return Err(LoadError::new(ErrorKind::FeatureExists)
                .with_detail(feature.name)
                .at_opt(self.features[existing.raw()].pos));
        }
        let id = FeatureId::new(self.features.len());
        self.feature_names.insert(feature.name.clone(), id);
        self.features.push(feature);
        let defaults: Vec<usize> = self.features.iter().map(|f| f.default).collect();
        for (instance, names) in phonemes_by_instance.iter().enumerate() {
            for name in names {
                let spec = self.find_or_insert_phoneme(name);
                while spec.feature_values.len() <= id.raw() {
                    spec.feature_values.push(defaults[spec.feature_values.len()]);
                }
                spec.feature_values[id.raw()] = instance;
            }
        }
        Ok(id)
    }

    /// Register a character class with its phoneme membership.
    /// A phoneme belongs to at most one class; re-assigning is an
    /// error.
    pub fn insert_class(
        &mut self,
        name: impl Into<String>,
        members: &[String],
        pos: Option<SourcePos>,
    ) -> LoadResult<ClassId> {
        let name = name.into();
        if let Some(&existing) = self.class_names.get(&name) {
            return Err(LoadError::new(ErrorKind::ClassExists)
                .with_detail(name)
                .at_opt(self.classes[existing.raw()].pos));
        }
        for member in members {
            if let Some(spec) = self.phonemes.get(member) {
                if let Some(old) = spec.class {
                    return Err(LoadError::new(ErrorKind::PhonemeAlreadyHasClass)
                        .with_detail(format!(
                            "{} is in {}; tried to insert it in {}",
                            member,
                            self.classes[old.raw()].name,
                            name
                        ))
                        .at_opt(pos));
                }
            }
        }
        let id = ClassId::new(self.classes.len());
        self.class_names.insert(name.clone(), id);
        self.classes.push(CharClass { name, pos });
        for member in members {
            let spec = self.find_or_insert_phoneme(member);
            spec.class = Some(id);
        }
        Ok(id)
    }

    /// Get or create the spec for a phoneme symbol.
    pub fn find_or_insert_phoneme(&mut self, name: &str) -> &mut PhonemeSpec {
        if !self.phonemes.contains_key(name) {
            self.phoneme_order.push(name.to_string());
            self.phonemes
                .insert(name.to_string(), PhonemeSpec::new(name));
        }
        self.phonemes.get_mut(name).unwrap()
    }

    /// Build the reverse index from core-feature vectors to canonical
    /// phonemes. Must run after the last insertion and before the
    /// first rule application.
    pub fn build_reverse_map(&mut self) {
        self.reverse.clear();
        for name in &self.phoneme_order {
            let key = self.spec_key(&self.phonemes[name]);
            self.reverse.entry(key).or_default().push(name.clone());
        }
    }

    // ==================== Lookups ====================

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(id.raw())
    }

    pub fn feature_by_name(&self, name: &str) -> LoadResult<(FeatureId, &Feature)> {
        let id = *self
            .feature_names
            .get(name)
            .ok_or_else(|| LoadError::new(ErrorKind::NoSuchFeature).with_detail(name))?;
        Ok((id, &self.features[id.raw()]))
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn class(&self, id: ClassId) -> Option<&CharClass> {
        self.classes.get(id.raw())
    }

    pub fn class_by_name(&self, name: &str) -> LoadResult<(ClassId, &CharClass)> {
        let id = *self
            .class_names
            .get(name)
            .ok_or_else(|| LoadError::new(ErrorKind::NoSuchClass).with_detail(name))?;
        Ok((id, &self.classes[id.raw()]))
    }

    pub fn phoneme(&self, name: &str) -> Option<&PhonemeSpec> {
        self.phonemes.get(name)
    }

    pub fn phoneme_by_name(&self, name: &str) -> LoadResult<&PhonemeSpec> {
        self.phonemes
            .get(name)
            .ok_or_else(|| LoadError::new(ErrorKind::NoSuchPhoneme).with_detail(name))
    }

    pub fn all_phonemes(&self) -> impl Iterator<Item = &PhonemeSpec> {
        self.phoneme_order.iter().map(|n| &self.phonemes[n])
    }

    // ==================== Feature values ====================

    /// The effective value of a feature on a spec: the stored entry,
    /// or the feature's default when the entry is missing.
    pub fn feature_value(&self, spec: &PhonemeSpec, feature: FeatureId) -> usize {
        spec.feature_values
            .get(feature.raw())
            .copied()
            .unwrap_or_else(|| self.feature(feature).map(|f| f.default).unwrap_or(0))
    }

    /// Set a feature value on a spec, growing the sparse vector with
    /// defaults as needed.
    pub fn set_feature_value(&self, spec: &mut PhonemeSpec, feature: FeatureId, value: usize) {
        while spec.feature_values.len() <= feature.raw() {
            let next = FeatureId::new(spec.feature_values.len());
            let default = self.feature(next).map(|f| f.default).unwrap_or(0);
            spec.feature_values.push(default);
        }
        spec.feature_values[feature.raw()] = value;
    }

    // ==================== Feature equality ====================

    /// Two specs are feature-equal iff they share a class and agree on
    /// every *core* feature; auxiliary features are ignored.
    pub fn feature_equal(&self, a: &PhonemeSpec, b: &PhonemeSpec) -> bool {
        if a.class != b.class {
            return false;
        }
        (0..self.features.len()).all(|i| {
            let id = FeatureId::new(i);
            !self.features[i].core || self.feature_value(a, id) == self.feature_value(b, id)
        })
    }

    /// Canonical phonemes whose core-feature vector equals `spec`'s.
    /// Empty until `build_reverse_map` has run.
    pub fn phonemes_by_spec(&self, spec: &PhonemeSpec) -> &[String] {
        self.reverse
            .get(&self.spec_key(spec))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn spec_key(&self, spec: &PhonemeSpec) -> SpecKey {
        SpecKey {
            class: spec.class,
            core_values: (0..self.features.len())
                .filter(|&i| self.features[i].core)
                .map(|i| self.feature_value(spec, FeatureId::new(i)))
                .collect(),
        }
    }
}
