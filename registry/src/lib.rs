//! Soundlaw Registry
//!
//! Owns the phoneme inventory: distinctive features, character classes,
//! and phoneme specs. Resolves names to ids, computes default and
//! explicit feature values, and maintains the reverse index from
//! core-feature vectors back to canonical phonemes.
//!
//! The registry is mutable during the load phase and read-only
//! afterwards; `build_reverse_map` must run after the last insertion
//! and before the first rule application.

mod registry;
mod types;

pub use registry::Registry;
pub use types::{CharClass, Feature, PhonemeSpec};
