//! Constraint operand evaluation.
//!
//! Operands evaluate identically during matching and rewriting, so a
//! dependent constraint can copy a feature value from a different
//! captured phoneme in either phase.

use crate::ast::{Constraint, Operand};
use crate::capture::Capture;
use soundlaw_core::FeatureId;
use soundlaw_registry::Registry;

/// Evaluate one operand to a feature-instance index.
///
/// A dependent operand resolves through the capture table; `None`
/// means the referenced matcher is not bound, which the verifier
/// rejects at load time and the matcher treats as a non-match.
pub fn eval_operand(
    registry: &Registry,
    operand: &Operand,
    feature: FeatureId,
    capture: &Capture<'_>,
) -> Option<usize> {
    match operand {
        Operand::Literal(instance) => Some(*instance),
        Operand::Matcher(key) => capture
            .get(key)
            .map(|binding| registry.feature_value(binding.bound.spec(), feature)),
    }
}

/// Whether a constraint is satisfied by a feature value, resolving
/// dependent operands through the capture table.
pub fn constraint_satisfied(
    registry: &Registry,
    constraint: &Constraint,
    value: usize,
    capture: &Capture<'_>,
) -> bool {
    let mut operand_values = Vec::with_capacity(constraint.operands.len());
    for operand in &constraint.operands {
        match eval_operand(registry, operand, constraint.feature, capture) {
            Some(v) => operand_values.push(v),
            None => return false,
        }
    }
    constraint.holds(value, &operand_values)
}
