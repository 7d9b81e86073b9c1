//! Identity types for registry entities.
//!
//! Identifiers are indices into the registry's definition tables:
//! - Dense, assigned in insertion order
//! - Immutable once assigned
//! - Opaque to external users

use std::fmt;

/// Unique identifier for a distinctive feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub usize);

impl FeatureId {
    /// Create a new FeatureId from a raw index.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the raw index.
    pub fn raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Unique identifier for a character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub usize);

impl ClassId {
    /// Create a new ClassId from a raw index.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the raw index.
    pub fn raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(FeatureId::new(3).to_string(), "f3");
        assert_eq!(ClassId::new(0).to_string(), "c0");
    }

    #[test]
    fn test_id_raw_roundtrip() {
        assert_eq!(FeatureId::new(7).raw(), 7);
        assert_eq!(ClassId::new(7).raw(), 7);
    }
}
