//! Omega synthesis: building the replacement segments from a capture.

use soundlaw_pattern::{eval_operand, Capture, MatcherBody, PatternElem, Segment};
use soundlaw_registry::{PhonemeSpec, Registry};

/// Synthesize the replacement sequence for an output pattern from the
/// capture of a successful match.
///
/// `None` means the attempt cannot be completed and is treated as a
/// non-match; the verifier guarantees well-formed rules never hit the
/// failure paths here.
pub fn synthesize(
    registry: &Registry,
    omega: &[PatternElem],
    capture: &Capture<'_>,
) -> Option<Vec<Segment>> {
    let mut out = Vec::with_capacity(omega.len());
    for elem in omega {
        match elem {
            PatternElem::Symbol(name) => out.push(Segment::Symbol(name.clone())),
            PatternElem::Boundary => out.push(Segment::Boundary),
            PatternElem::Spec(spec) => out.push(resolve(registry, spec.clone())),
            PatternElem::Matcher(matcher) => {
                let binding = capture.get(&matcher.key())?;
                match &matcher.body {
                    MatcherBody::Enumeration(names) => {
                        // Emit the Nth alternative of this occurrence's
                        // enumeration, N being the index bound while
                        // matching.
                        let name = names.get(binding.index?)?;
                        out.push(Segment::Symbol(name.clone()));
                    }
                    MatcherBody::Constraints(constraints) => {
                        let mut spec = binding.bound.spec().clone();
                        for con in constraints {
                            let operand = con.operands.first()?;
                            let value = eval_operand(registry, operand, con.feature, capture)?;
                            registry.set_feature_value(&mut spec, con.feature, value);
                        }
                        out.push(resolve(registry, spec));
                    }
                }
            }
            PatternElem::Alternation(_) | PatternElem::Repeat(_) => return None,
        }
    }
    Some(out)
}

/// Resolve a synthesized spec to its canonical registry phoneme when
/// one with the same core-feature vector exists; otherwise keep it as
/// an anonymous spec segment.
fn resolve(registry: &Registry, spec: PhonemeSpec) -> Segment {
    match registry.phonemes_by_spec(&spec).first() {
        Some(name) => Segment::Symbol(name.clone()),
        None => Segment::Spec(spec),
    }
}
