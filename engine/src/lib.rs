//! Soundlaw Engine
//!
//! The façade tying the registry and the rule list together: ordered
//! construction, whole-ruleset verification, finalization, word
//! segmentation, rule application, and text rendering.

mod engine;
mod render;
mod split;

pub use engine::Engine;
pub use render::render;
pub use split::split_word;
