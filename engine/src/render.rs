//! Rendering a word back to text.

use soundlaw_core::FeatureId;
use soundlaw_pattern::{Segment, Word};
use soundlaw_registry::{PhonemeSpec, Registry};

/// Render a word: symbols concatenate, boundaries become `#`, and
/// anonymous specs get a bracketed feature dump for diagnostic
/// visibility.
pub fn render(registry: &Registry, word: &Word) -> String {
    let mut out = String::new();
    for segment in word {
        match segment {
            Segment::Symbol(name) => out.push_str(name),
            Segment::Boundary => out.push('#'),
            Segment::Spec(spec) => out.push_str(&render_spec(registry, spec)),
        }
    }
    out
}

/// `[phoneme/<class>:<feature>=<value>,...]` over core features, `*`
/// for a wildcard class.
fn render_spec(registry: &Registry, spec: &PhonemeSpec) -> String {
    let class = spec
        .class
        .and_then(|c| registry.class(c))
        .map(|c| c.name.as_str())
        .unwrap_or("*");
    let features: Vec<String> = (0..registry.feature_count())
        .filter_map(|i| {
            let id = FeatureId::new(i);
            let feature = registry.feature(id)?;
            if !feature.core {
                return None;
            }
            let value = registry.feature_value(spec, id);
            let instance = feature
                .instances
                .get(value)
                .cloned()
                .unwrap_or_else(|| value.to_string());
            Some(format!("{}={}", feature.name, instance))
        })
        .collect();
    format!("[{}/{}:{}]", spec.name, class, features.join(","))
}
