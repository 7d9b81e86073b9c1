//! Soundlaw Core Types
//!
//! This crate provides the foundational types used throughout the
//! soundlaw engine:
//! - Identity types (FeatureId, ClassId)
//! - Source positions for diagnostics
//! - The load-time error model (ErrorKind, LoadError)

mod error;
mod id;
mod pos;

pub use error::*;
pub use id::*;
pub use pos::*;
