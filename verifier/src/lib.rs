//! Static rule verification.
//!
//! A word-independent pass executed once per rule at load time. Every
//! structural defect is accumulated and reported with the rule's
//! source position, so a single pass surfaces all the problems in a
//! rule set; the matching hot path then never re-checks what is
//! guaranteed here.

mod scope;
mod verify;

pub use scope::ScopeStack;
pub use verify::{verify, verify_rule, verify_sound_change};
