//! Inventory definition types.

use soundlaw_core::{ClassId, ErrorKind, FeatureId, LoadError, LoadResult, SourcePos};

/// A named dimension of phonological contrast with a closed set of
/// named instances.
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature name (e.g. "voice").
    pub name: String,
    /// Ordered instance names (e.g. "voiceless", "voiced").
    pub instances: Vec<String>,
    /// Index of the default instance.
    pub default: usize,
    /// Core features participate in ordinary matching and equality;
    /// auxiliary features are ignored by both.
    pub core: bool,
    /// Ordered features support relational comparisons, not just
    /// equality.
    pub ordered: bool,
    /// Where the feature was declared.
    pub pos: Option<SourcePos>,
}

impl Feature {
    pub fn new(name: impl Into<String>, instances: Vec<String>) -> Self {
        Self {
            name: name.into(),
            instances,
            default: 0,
            core: true,
            ordered: false,
            pos: None,
        }
    }

    pub fn with_default(mut self, default: usize) -> Self {
        self.default = default;
        self
    }

    pub fn auxiliary(mut self) -> Self {
        self.core = false;
        self
    }

    pub fn ordered(mut self) -> Self {
        self.ordered = true;
        self
    }

    pub fn at(mut self, pos: SourcePos) -> Self {
        self.pos = Some(pos);
        self
    }

    /// Look up an instance index by name.
    pub fn instance_by_name(&self, name: &str) -> LoadResult<usize> {
        self.instances
            .iter()
            .position(|i| i == name)
            .ok_or_else(|| LoadError::new(ErrorKind::NoSuchFeatureInstance).with_detail(name))
    }
}

/// A named partition of the phoneme inventory.
#[derive(Debug, Clone)]
pub struct CharClass {
    /// Class name (e.g. "vowel").
    pub name: String,
    /// Where the class was declared.
    pub pos: Option<SourcePos>,
}

impl CharClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pos: None,
        }
    }
}

/// A phoneme: a symbol name, an optional class, and a sparse vector of
/// feature-instance indices. Missing entries implicitly take the
/// feature's default.
#[derive(Debug, Clone, Default)]
pub struct PhonemeSpec {
    pub name: String,
    pub class: Option<ClassId>,
    pub feature_values: Vec<usize>,
}

impl PhonemeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: None,
            feature_values: Vec::new(),
        }
    }

    /// Check class membership.
    pub fn has_class(&self, class: ClassId) -> bool {
        self.class == Some(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_by_name() {
        let f = Feature::new(
            "voice",
            vec!["voiceless".to_string(), "voiced".to_string()],
        );
        assert_eq!(f.instance_by_name("voiced").unwrap(), 1);
        let err = f.instance_by_name("aspirated").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoSuchFeatureInstance);
        assert_eq!(err.detail.as_deref(), Some("aspirated"));
    }

    #[test]
    fn test_feature_builder_flags() {
        let f = Feature::new("stress", vec!["no".into(), "yes".into()])
            .auxiliary()
            .with_default(1);
        assert!(!f.core);
        assert_eq!(f.default, 1);
        assert!(!f.ordered);
    }
}
