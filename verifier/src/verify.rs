//! The verification pass itself.

use crate::scope::ScopeStack;
use soundlaw_core::{ErrorKind, LoadError, SourcePos};
use soundlaw_pattern::{CharMatcher, Comparator, MatcherBody, MatcherKey, Operand, PatternElem};
use soundlaw_registry::Registry;
use soundlaw_rule::{SimpleRule, SoundChange};
use std::collections::HashMap;

/// Verify a whole rule set, accumulating every violation.
pub fn verify(registry: &Registry, changes: &[SoundChange]) -> Vec<LoadError> {
    changes
        .iter()
        .flat_map(|sc| verify_sound_change(registry, sc))
        .collect()
}

/// Verify one sound change (all component rules of a compound).
pub fn verify_sound_change(registry: &Registry, change: &SoundChange) -> Vec<LoadError> {
    change
        .rule
        .simple_rules()
        .iter()
        .flat_map(|rule| verify_rule(registry, rule, rule.pos.or(change.pos)))
        .collect()
}

/// Verify one simple rule.
pub fn verify_rule(
    registry: &Registry,
    rule: &SimpleRule,
    pos: Option<SourcePos>,
) -> Vec<LoadError> {
    let mut checker = Checker {
        registry,
        pos,
        errors: Vec::new(),
        scopes: ScopeStack::new(),
        has_labelled: false,
        has_unlabelled: false,
        shapes: HashMap::new(),
    };
    checker.check_rule(rule);
    checker.errors
}

/// Which pattern of the rule is being walked; boundary placement
/// depends on it.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Role {
    Alpha,
    LeftContext,
    RightContext,
}

/// The body kind first seen for a (class, label); later occurrences
/// must agree.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Shape {
    Constraints,
    Enumeration(usize),
}

struct Checker<'a> {
    registry: &'a Registry,
    pos: Option<SourcePos>,
    errors: Vec<LoadError>,
    scopes: ScopeStack,
    /// Matcher usage across the whole rule; a simple rule may not use
    /// both labelled and unlabelled matchers.
    has_labelled: bool,
    has_unlabelled: bool,
    shapes: HashMap<MatcherKey, Shape>,
}

impl Checker<'_> {
    fn check_rule(&mut self, rule: &SimpleRule) {
        self.walk(&rule.alpha, Role::Alpha, false);
        for (left, right) in &rule.envs {
            self.walk(left, Role::LeftContext, false);
            self.walk(right, Role::RightContext, false);
        }
        self.check_omega(&rule.omega);

        if self.has_labelled && self.has_unlabelled {
            self.report(ErrorKind::MixedMatchers, String::new());
        }
    }

    fn walk(&mut self, pattern: &[PatternElem], role: Role, nested: bool) {
        for (i, elem) in pattern.iter().enumerate() {
            match elem {
                PatternElem::Symbol(_) | PatternElem::Spec(_) => {}
                PatternElem::Boundary => {
                    let placed_ok = !nested
                        && match role {
                            Role::LeftContext => i == 0,
                            Role::RightContext => i == pattern.len() - 1,
                            Role::Alpha => false,
                        };
                    if !placed_ok {
                        self.report(ErrorKind::SpacesWrong, "#");
                    }
                }
                PatternElem::Matcher(matcher) => self.check_matcher(matcher),
                PatternElem::Alternation(alt) => {
                    // Only labels bound in every branch survive the
                    // alternation.
                    let mut common: Option<std::collections::HashSet<MatcherKey>> = None;
                    for option in &alt.options {
                        self.scopes.push();
                        self.walk(option, role, true);
                        let frame = self.scopes.pop();
                        common = Some(match common {
                            None => frame,
                            Some(prev) => prev.intersection(&frame).copied().collect(),
                        });
                    }
                    self.scopes.extend(common.unwrap_or_default());
                }
                PatternElem::Repeat(rep) => {
                    // The repeated pattern is scoped as a single
                    // pass-through.
                    self.scopes.push();
                    self.walk(&rep.pattern, role, true);
                    let frame = self.scopes.pop();
                    self.scopes.extend(frame);
                }
            }
        }
    }

    fn check_matcher(&mut self, matcher: &CharMatcher) {
        if matcher.label == 0 {
            self.has_unlabelled = true;
        } else {
            self.has_labelled = true;
        }

        self.check_shape(matcher);
        for con in matcher.constraints() {
            if con.comparator.is_relational() {
                let ordered = self
                    .registry
                    .feature(con.feature)
                    .is_some_and(|f| f.ordered);
                if !ordered {
                    self.report(
                        ErrorKind::OrderedConstraintUnorderedFeature,
                        con.describe(self.registry),
                    );
                }
            }
            self.check_operands(matcher, con.operands.iter());
        }
        if matcher.label != 0 {
            self.scopes.bind(matcher.key());
        }
    }

    fn check_omega(&mut self, omega: &[PatternElem]) {
        for elem in omega {
            if !elem.is_single() {
                self.report(ErrorKind::NonSingleCharInOmega, String::new());
                continue;
            }
            if let PatternElem::Matcher(matcher) = elem {
                if matcher.label == 0 || !self.scopes.is_bound(&matcher.key()) {
                    self.report(ErrorKind::UndefinedMatcher, matcher.describe(self.registry));
                    continue;
                }
                self.check_shape(matcher);
                for con in matcher.constraints() {
                    if con.comparator != Comparator::Eq {
                        self.report(ErrorKind::InvalidOperatorOmega, con.describe(self.registry));
                    }
                    if con.operands.len() != 1 {
                        self.report(ErrorKind::MultipleInstancesOmega, con.describe(self.registry));
                    }
                    let core = self.registry.feature(con.feature).is_some_and(|f| f.core);
                    if !core {
                        let name = self
                            .registry
                            .feature(con.feature)
                            .map(|f| f.name.clone())
                            .unwrap_or_default();
                        self.report(ErrorKind::NonCoreFeatureSet, name);
                    }
                    self.check_operands(matcher, con.operands.iter());
                }
            }
        }
    }

    /// Dependent operands must reference a label already bound in
    /// scan order.
    fn check_operands<'o>(
        &mut self,
        matcher: &CharMatcher,
        operands: impl Iterator<Item = &'o Operand>,
    ) {
        for operand in operands {
            if let Operand::Matcher(key) = operand {
                if !self.scopes.is_bound(key) {
                    self.report(
                        ErrorKind::UndefinedDependentConstraint,
                        matcher.describe(self.registry),
                    );
                }
            }
        }
    }

    /// Enumeration matchers sharing a key must keep the same body kind
    /// and enumerate the same number of phonemes as first seen.
    fn check_shape(&mut self, matcher: &CharMatcher) {
        let shape = match &matcher.body {
            MatcherBody::Constraints(_) => Shape::Constraints,
            MatcherBody::Enumeration(names) => Shape::Enumeration(names.len()),
        };
        match self.shapes.get(&matcher.key()) {
            None => {
                self.shapes.insert(matcher.key(), shape);
            }
            Some(first) => match (*first, shape) {
                (Shape::Enumeration(a), Shape::Enumeration(b)) if a != b => {
                    self.report(
                        ErrorKind::EnumCharCountMismatch,
                        matcher.describe(self.registry),
                    );
                }
                (Shape::Constraints, Shape::Enumeration(_))
                | (Shape::Enumeration(_), Shape::Constraints) => {
                    self.report(ErrorKind::EnumToNonEnum, matcher.describe(self.registry));
                }
                _ => {}
            },
        }
    }

    fn report(&mut self, kind: ErrorKind, detail: impl Into<String>) {
        let detail = detail.into();
        let mut err = LoadError::new(kind).at_opt(self.pos);
        if !detail.is_empty() {
            err = err.with_detail(detail);
        }
        self.errors.push(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundlaw_core::ClassId;
    use soundlaw_pattern::{Alternation, Constraint, Repeat};
    use soundlaw_registry::Feature;

    fn test_registry() -> Registry {
        let mut reg = Registry::new();
        reg.insert_feature(
            Feature::new("voice", vec!["voiceless".into(), "voiced".into()]),
            &[vec![], vec!["b".into(), "d".into(), "g".into()]],
        )
        .unwrap();
        reg.insert_feature(
            Feature::new("height", vec!["low".into(), "mid".into(), "high".into()]).ordered(),
            &[
                vec!["a".into()],
                vec!["e".into()],
                vec!["i".into(), "u".into()],
            ],
        )
        .unwrap();
        reg.insert_feature(
            Feature::new("stress", vec!["no".into(), "yes".into()]).auxiliary(),
            &[],
        )
        .unwrap();
        reg.insert_class(
            "obstruent",
            &[
                "p".into(),
                "t".into(),
                "k".into(),
                "b".into(),
                "d".into(),
                "g".into(),
            ],
            None,
        )
        .unwrap();
        reg.insert_class(
            "vowel",
            &["a".into(), "e".into(), "i".into(), "u".into()],
            None,
        )
        .unwrap();
        reg.build_reverse_map();
        reg
    }

    fn obstruent(reg: &Registry) -> ClassId {
        reg.class_by_name("obstruent").unwrap().0
    }

    fn vowel(reg: &Registry) -> ClassId {
        reg.class_by_name("vowel").unwrap().0
    }

    fn labelled(class: ClassId, label: u32) -> PatternElem {
        PatternElem::Matcher(CharMatcher::labelled(Some(class), label).unwrap())
    }

    fn kinds(errors: &[LoadError]) -> Vec<ErrorKind> {
        errors.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_well_formed_rule_passes() {
        let reg = test_registry();
        let (voice, _) = reg.feature_by_name("voice").unwrap();
        let c = obstruent(&reg);
        let rule = SimpleRule::new(
            vec![labelled(c, 1)],
            vec![PatternElem::Matcher(
                CharMatcher::labelled(Some(c), 1)
                    .unwrap()
                    .with_constraints(vec![Constraint::new(
                        voice,
                        Comparator::Eq,
                        vec![Operand::Literal(1)],
                    )]),
            )],
        )
        .env(
            vec![labelled(vowel(&reg), 2)],
            vec![labelled(vowel(&reg), 3)],
        );
        assert!(verify_rule(&reg, &rule, None).is_empty());
    }

    #[test]
    fn test_omega_reference_to_unbound_label() {
        let reg = test_registry();
        let c = obstruent(&reg);
        let rule = SimpleRule::new(vec![labelled(c, 1)], vec![labelled(c, 2)]);
        assert_eq!(kinds(&verify_rule(&reg, &rule, None)), [ErrorKind::UndefinedMatcher]);
    }

    #[test]
    fn test_omega_unlabelled_matcher_is_undefined() {
        let reg = test_registry();
        let c = obstruent(&reg);
        let rule = SimpleRule::new(
            vec![labelled(c, 1)],
            vec![PatternElem::Matcher(CharMatcher::unlabelled(Some(c)))],
        );
        let errors = verify_rule(&reg, &rule, None);
        assert!(kinds(&errors).contains(&ErrorKind::UndefinedMatcher));
    }

    #[test]
    fn test_omega_rejects_non_equality_comparator() {
        let reg = test_registry();
        let (voice, _) = reg.feature_by_name("voice").unwrap();
        let c = obstruent(&reg);
        let rule = SimpleRule::new(
            vec![labelled(c, 1)],
            vec![PatternElem::Matcher(
                CharMatcher::labelled(Some(c), 1)
                    .unwrap()
                    .with_constraints(vec![Constraint::new(
                        voice,
                        Comparator::Ne,
                        vec![Operand::Literal(1)],
                    )]),
            )],
        );
        assert_eq!(
            kinds(&verify_rule(&reg, &rule, None)),
            [ErrorKind::InvalidOperatorOmega]
        );
    }

    #[test]
    fn test_omega_rejects_multiple_operands() {
        let reg = test_registry();
        let (voice, _) = reg.feature_by_name("voice").unwrap();
        let c = obstruent(&reg);
        let rule = SimpleRule::new(
            vec![labelled(c, 1)],
            vec![PatternElem::Matcher(
                CharMatcher::labelled(Some(c), 1)
                    .unwrap()
                    .with_constraints(vec![Constraint::new(
                        voice,
                        Comparator::Eq,
                        vec![Operand::Literal(0), Operand::Literal(1)],
                    )]),
            )],
        );
        assert_eq!(
            kinds(&verify_rule(&reg, &rule, None)),
            [ErrorKind::MultipleInstancesOmega]
        );
    }

    #[test]
    fn test_omega_rejects_auxiliary_feature() {
        let reg = test_registry();
        let (stress, _) = reg.feature_by_name("stress").unwrap();
        let c = obstruent(&reg);
        let rule = SimpleRule::new(
            vec![labelled(c, 1)],
            vec![PatternElem::Matcher(
                CharMatcher::labelled(Some(c), 1)
                    .unwrap()
                    .with_constraints(vec![Constraint::new(
                        stress,
                        Comparator::Eq,
                        vec![Operand::Literal(1)],
                    )]),
            )],
        );
        assert_eq!(
            kinds(&verify_rule(&reg, &rule, None)),
            [ErrorKind::NonCoreFeatureSet]
        );
    }

    #[test]
    fn test_omega_rejects_alternation_and_repetition() {
        let reg = test_registry();
        let rule = SimpleRule::new(
            vec![PatternElem::Symbol("a".into())],
            vec![
                PatternElem::Alternation(Alternation { options: vec![] }),
                PatternElem::Repeat(Repeat {
                    pattern: vec![],
                    min: 0,
                    max: None,
                }),
            ],
        );
        assert_eq!(
            kinds(&verify_rule(&reg, &rule, None)),
            [
                ErrorKind::NonSingleCharInOmega,
                ErrorKind::NonSingleCharInOmega
            ]
        );
    }

    #[test]
    fn test_relational_comparator_requires_ordered_feature() {
        let reg = test_registry();
        let (voice, _) = reg.feature_by_name("voice").unwrap();
        let (height, _) = reg.feature_by_name("height").unwrap();
        let c = vowel(&reg);

        // height is ordered: fine.
        let ok = SimpleRule::new(
            vec![PatternElem::Matcher(
                CharMatcher::labelled(Some(c), 1)
                    .unwrap()
                    .with_constraints(vec![Constraint::new(
                        height,
                        Comparator::Ge,
                        vec![Operand::Literal(1)],
                    )]),
            )],
            vec![PatternElem::Symbol("i".into())],
        );
        assert!(verify_rule(&reg, &ok, None).is_empty());

        // voice is not.
        let bad = SimpleRule::new(
            vec![PatternElem::Matcher(
                CharMatcher::labelled(Some(obstruent(&reg)), 1)
                    .unwrap()
                    .with_constraints(vec![Constraint::new(
                        voice,
                        Comparator::Lt,
                        vec![Operand::Literal(1)],
                    )]),
            )],
            vec![PatternElem::Symbol("p".into())],
        );
        assert_eq!(
            kinds(&verify_rule(&reg, &bad, None)),
            [ErrorKind::OrderedConstraintUnorderedFeature]
        );
    }

    #[test]
    fn test_dependent_constraint_must_be_bound_earlier() {
        let reg = test_registry();
        let (voice, _) = reg.feature_by_name("voice").unwrap();
        let c = obstruent(&reg);
        let dependent = PatternElem::Matcher(
            CharMatcher::labelled(Some(c), 2)
                .unwrap()
                .with_constraints(vec![Constraint::new(
                    voice,
                    Comparator::Eq,
                    vec![Operand::Matcher((Some(c), 1))],
                )]),
        );

        // Reference before binding: rejected.
        let bad = SimpleRule::new(
            vec![dependent.clone(), labelled(c, 1)],
            vec![PatternElem::Symbol("p".into())],
        );
        assert_eq!(
            kinds(&verify_rule(&reg, &bad, None)),
            [ErrorKind::UndefinedDependentConstraint]
        );

        // Binding first: accepted.
        let ok = SimpleRule::new(
            vec![labelled(c, 1), dependent],
            vec![PatternElem::Symbol("p".into())],
        );
        assert!(verify_rule(&reg, &ok, None).is_empty());
    }

    #[test]
    fn test_alternation_scope_is_branch_intersection() {
        let reg = test_registry();
        let c = obstruent(&reg);
        // Label 1 bound in both branches stays in scope; label 2 bound
        // in one branch does not.
        let alt = PatternElem::Alternation(Alternation {
            options: vec![
                vec![labelled(c, 1), labelled(c, 2)],
                vec![labelled(c, 1)],
            ],
        });

        let ok = SimpleRule::new(vec![alt.clone()], vec![labelled(c, 1)]);
        assert!(verify_rule(&reg, &ok, None).is_empty());

        let bad = SimpleRule::new(vec![alt], vec![labelled(c, 2)]);
        assert_eq!(
            kinds(&verify_rule(&reg, &bad, None)),
            [ErrorKind::UndefinedMatcher]
        );
    }

    #[test]
    fn test_repeat_scope_passes_through() {
        let reg = test_registry();
        let c = obstruent(&reg);
        let rule = SimpleRule::new(
            vec![PatternElem::Repeat(Repeat {
                pattern: vec![labelled(c, 1)],
                min: 1,
                max: None,
            })],
            vec![labelled(c, 1)],
        );
        assert!(verify_rule(&reg, &rule, None).is_empty());
    }

    #[test]
    fn test_mixed_labelled_and_unlabelled_matchers() {
        let reg = test_registry();
        let c = obstruent(&reg);
        let rule = SimpleRule::new(
            vec![
                labelled(c, 1),
                PatternElem::Matcher(CharMatcher::unlabelled(Some(c))),
            ],
            vec![labelled(c, 1)],
        );
        assert_eq!(
            kinds(&verify_rule(&reg, &rule, None)),
            [ErrorKind::MixedMatchers]
        );
    }

    #[test]
    fn test_mixing_is_tracked_across_the_whole_rule() {
        // The flags are rule-global: an unlabelled context matcher of a
        // different class still mixes with a labelled alpha matcher.
        let reg = test_registry();
        let c = obstruent(&reg);
        let v = vowel(&reg);
        let rule = SimpleRule::new(vec![labelled(c, 1)], vec![labelled(c, 1)]).env(
            vec![PatternElem::Matcher(CharMatcher::unlabelled(Some(v)))],
            vec![PatternElem::Matcher(CharMatcher::unlabelled(Some(v)))],
        );
        assert_eq!(
            kinds(&verify_rule(&reg, &rule, None)),
            [ErrorKind::MixedMatchers]
        );
    }

    #[test]
    fn test_fully_unlabelled_rule_passes() {
        let reg = test_registry();
        let c = obstruent(&reg);
        let rule = SimpleRule::new(
            vec![PatternElem::Matcher(CharMatcher::unlabelled(Some(c)))],
            vec![PatternElem::Symbol("p".into())],
        );
        assert!(verify_rule(&reg, &rule, None).is_empty());
    }

    #[test]
    fn test_boundary_placement() {
        let reg = test_registry();

        // First in a left context, last in a right context: fine.
        let ok = SimpleRule::new(
            vec![PatternElem::Symbol("k".into())],
            vec![PatternElem::Symbol("g".into())],
        )
        .env(
            vec![PatternElem::Boundary, PatternElem::Symbol("a".into())],
            vec![PatternElem::Symbol("a".into()), PatternElem::Boundary],
        );
        assert!(verify_rule(&reg, &ok, None).is_empty());

        // Anywhere else: rejected.
        let bad = SimpleRule::new(
            vec![PatternElem::Boundary],
            vec![PatternElem::Symbol("g".into())],
        )
        .env(
            vec![PatternElem::Symbol("a".into()), PatternElem::Boundary],
            vec![PatternElem::Boundary, PatternElem::Symbol("a".into())],
        );
        assert_eq!(
            kinds(&verify_rule(&reg, &bad, None)),
            [
                ErrorKind::SpacesWrong,
                ErrorKind::SpacesWrong,
                ErrorKind::SpacesWrong
            ]
        );
    }

    #[test]
    fn test_enumeration_count_mismatch() {
        let reg = test_registry();
        let c = obstruent(&reg);
        let first = PatternElem::Matcher(
            CharMatcher::labelled(Some(c), 1)
                .unwrap()
                .with_enumeration(vec!["p".into(), "t".into(), "k".into()]),
        );
        let second = PatternElem::Matcher(
            CharMatcher::labelled(Some(c), 1)
                .unwrap()
                .with_enumeration(vec!["b".into(), "d".into()]),
        );
        let rule = SimpleRule::new(vec![first], vec![second]);
        assert_eq!(
            kinds(&verify_rule(&reg, &rule, None)),
            [ErrorKind::EnumCharCountMismatch]
        );
    }

    #[test]
    fn test_enumeration_kind_mismatch() {
        let reg = test_registry();
        let c = obstruent(&reg);
        let first = PatternElem::Matcher(
            CharMatcher::labelled(Some(c), 1)
                .unwrap()
                .with_enumeration(vec!["p".into(), "t".into()]),
        );
        let second = labelled(c, 1);
        let rule = SimpleRule::new(vec![first], vec![second]);
        assert_eq!(
            kinds(&verify_rule(&reg, &rule, None)),
            [ErrorKind::EnumToNonEnum]
        );
    }

    #[test]
    fn test_all_violations_are_accumulated() {
        let reg = test_registry();
        let c = obstruent(&reg);
        let rule = SimpleRule::new(
            vec![PatternElem::Boundary],
            vec![
                labelled(c, 9),
                PatternElem::Alternation(Alternation { options: vec![] }),
            ],
        );
        let errors = verify_rule(&reg, &rule, None);
        assert_eq!(
            kinds(&errors),
            [
                ErrorKind::SpacesWrong,
                ErrorKind::UndefinedMatcher,
                ErrorKind::NonSingleCharInOmega
            ]
        );
    }

    #[test]
    fn test_errors_carry_rule_position() {
        let reg = test_registry();
        let c = obstruent(&reg);
        let pos = SourcePos::new(4, 0);
        let rule = SimpleRule::new(
            vec![PatternElem::Symbol("a".into())],
            vec![labelled(c, 1)],
        )
        .at(pos);
        let errors = verify_rule(&reg, &rule, rule.pos);
        assert_eq!(errors[0].pos, Some(pos));
    }
}
