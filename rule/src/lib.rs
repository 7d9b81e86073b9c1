//! Rules, rewriting, and the per-rule driver.

mod driver;
mod error;
mod predicate;
mod rewrite;
mod rule;

pub use driver::{Behaviour, EvaluationOrder, SoundChange};
pub use error::{ApplyError, PredicateError};
pub use predicate::{MatchSpan, Predicate};
pub use rewrite::synthesize;
pub use rule::{CompoundRule, Replacement, Rule, SimpleRule};
