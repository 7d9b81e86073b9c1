//! The per-rule driver: scanning one rule across a whole word.

use crate::error::ApplyError;
use crate::rule::Rule;
use soundlaw_core::SourcePos;
use soundlaw_pattern::{Direction, Word};
use soundlaw_registry::Registry;
use std::collections::HashSet;

/// The order positions are probed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationOrder {
    #[default]
    Ltr,
    Rtl,
}

impl EvaluationOrder {
    pub fn direction(self) -> Direction {
        match self {
            EvaluationOrder::Ltr => Direction::Ltr,
            EvaluationOrder::Rtl => Direction::Rtl,
        }
    }
}

/// The iteration policy for repeated application to one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behaviour {
    /// Stop scanning after the first rewrite.
    #[default]
    Once,
    /// Continue past each rewrite without re-examining the segments it
    /// just produced.
    LoopNsi,
    /// Advance one position at a time, allowing overlapping rematches.
    LoopSi,
}

/// A rule with its application policy: evaluation order, behaviour,
/// and an optional part-of-speech restriction.
#[derive(Debug)]
pub struct SoundChange {
    pub rule: Rule,
    pub order: EvaluationOrder,
    pub behaviour: Behaviour,
    /// Part-of-speech tags the rule applies to; empty means
    /// unrestricted.
    pub pos_tags: HashSet<String>,
    /// Where the sound change was declared.
    pub pos: Option<SourcePos>,
}

impl SoundChange {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            order: EvaluationOrder::default(),
            behaviour: Behaviour::default(),
            pos_tags: HashSet::new(),
            pos: None,
        }
    }

    pub fn with_order(mut self, order: EvaluationOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    pub fn restrict_to(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.pos_tags.extend(tags);
        self
    }

    pub fn at(mut self, pos: SourcePos) -> Self {
        self.pos = Some(pos);
        self
    }

    fn applies_to(&self, tag: Option<&str>) -> bool {
        self.pos_tags.is_empty() || tag.is_some_and(|t| self.pos_tags.contains(t))
    }

    /// Apply the rule across the word. Probes every offset from one
    /// end to the other, including one past the last segment so
    /// boundary epenthesis can fire at the far edge.
    pub fn apply(
        &self,
        registry: &Registry,
        word: &mut Word,
        tag: Option<&str>,
    ) -> Result<(), ApplyError> {
        if !self.applies_to(tag) {
            return Ok(());
        }
        let dir = self.order.direction();
        let mut offset = 0;
        while offset <= word.len() {
            let at = match dir {
                Direction::Ltr => offset,
                Direction::Rtl => word.len() - offset,
            };
            let outcome = self.rule.try_replace(registry, word, at, dir)?;
            match (outcome, self.behaviour) {
                (Some(_), Behaviour::Once) => break,
                (Some(replacement), Behaviour::LoopNsi) => {
                    // Resume at the end of the inserted span. A
                    // deletion resumes at the splice point itself; only
                    // a rewrite that neither removed nor inserted
                    // anything must still advance.
                    offset += if replacement.removed == 0 && replacement.inserted == 0 {
                        1
                    } else {
                        replacement.inserted
                    };
                }
                _ => offset += 1,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::SimpleRule;
    use soundlaw_pattern::{CharMatcher, Comparator, Constraint, Operand, PatternElem, Segment};
    use soundlaw_registry::Feature;

    fn voicing_registry() -> Registry {
        let mut reg = Registry::new();
        reg.insert_feature(
            Feature::new("voice", vec!["voiceless".into(), "voiced".into()]),
            &[vec![], vec!["b".into(), "d".into(), "g".into()]],
        )
        .unwrap();
        reg.insert_feature(
            Feature::new(
                "place",
                vec!["labial".into(), "alveolar".into(), "velar".into()],
            ),
            &[
                vec!["p".into(), "b".into()],
                vec!["t".into(), "d".into()],
                vec!["k".into(), "g".into()],
            ],
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
        reg.insert_class("vowel", &["a".into(), "i".into(), "u".into()], None)
            .unwrap();
        reg.build_reverse_map();
        reg
    }

    fn word(symbols: &[&str]) -> Word {
        symbols
            .iter()
            .map(|s| Segment::Symbol(s.to_string()))
            .collect()
    }

    fn rendered(word: &Word) -> String {
        word.iter()
            .map(|seg| seg.as_symbol().unwrap_or("?"))
            .collect()
    }

    /// $(obstruent:1) -> $(obstruent:1|voice=voiced)
    fn voicing_rule(reg: &Registry) -> Rule {
        let (obstruent, _) = reg.class_by_name("obstruent").unwrap();
        let (voice, _) = reg.feature_by_name("voice").unwrap();
        let alpha = vec![PatternElem::Matcher(
            CharMatcher::labelled(Some(obstruent), 1).unwrap(),
        )];
        let omega = vec![PatternElem::Matcher(
            CharMatcher::labelled(Some(obstruent), 1)
                .unwrap()
                .with_constraints(vec![Constraint::new(
                    voice,
                    Comparator::Eq,
                    vec![Operand::Literal(1)],
                )]),
        )];
        Rule::Simple(SimpleRule::new(alpha, omega))
    }

    #[test]
    fn test_once_stops_after_first_rewrite() {
        let reg = voicing_registry();
        let sc = SoundChange::new(voicing_rule(&reg));
        let mut w = word(&["p", "a", "t"]);
        sc.apply(&reg, &mut w, None).unwrap();
        assert_eq!(rendered(&w), "bat");
    }

    #[test]
    fn test_once_with_no_eligible_site_is_identity() {
        let reg = voicing_registry();
        let sc = SoundChange::new(voicing_rule(&reg));
        let mut w = word(&["a", "i", "u"]);
        sc.apply(&reg, &mut w, None).unwrap();
        assert_eq!(rendered(&w), "aiu");
    }

    #[test]
    fn test_loop_nsi_rewrites_every_site() {
        let reg = voicing_registry();
        let sc = SoundChange::new(voicing_rule(&reg)).with_behaviour(Behaviour::LoopNsi);
        let mut w = word(&["p", "a", "t", "a", "k"]);
        sc.apply(&reg, &mut w, None).unwrap();
        assert_eq!(rendered(&w), "badag");
    }

    #[test]
    fn test_loop_nsi_is_idempotent() {
        let reg = voicing_registry();
        let sc = SoundChange::new(voicing_rule(&reg)).with_behaviour(Behaviour::LoopNsi);
        let mut w = word(&["p", "a", "t"]);
        sc.apply(&reg, &mut w, None).unwrap();
        let once = rendered(&w);
        sc.apply(&reg, &mut w, None).unwrap();
        assert_eq!(rendered(&w), once);
    }

    #[test]
    fn test_loop_nsi_skips_own_output() {
        let reg = voicing_registry();
        // p -> p p would loop forever if the scan re-entered its own
        // output.
        let rule = Rule::Simple(SimpleRule::new(
            vec![PatternElem::Symbol("p".into())],
            vec![
                PatternElem::Symbol("p".into()),
                PatternElem::Symbol("p".into()),
            ],
        ));
        let sc = SoundChange::new(rule).with_behaviour(Behaviour::LoopNsi);
        let mut w = word(&["p", "a", "p"]);
        sc.apply(&reg, &mut w, None).unwrap();
        assert_eq!(rendered(&w), "ppapp");
    }

    #[test]
    fn test_loop_nsi_deletes_adjacent_sites() {
        let reg = voicing_registry();
        // a -> ∅: after each deletion the scan resumes at the splice
        // point, so the segment that slid in is examined too.
        let rule = Rule::Simple(SimpleRule::new(
            vec![PatternElem::Symbol("a".into())],
            Vec::new(),
        ));
        let sc = SoundChange::new(rule).with_behaviour(Behaviour::LoopNsi);

        let mut w = word(&["a", "a"]);
        sc.apply(&reg, &mut w, None).unwrap();
        assert!(w.is_empty());

        let mut w = word(&["p", "a", "a", "t", "a"]);
        sc.apply(&reg, &mut w, None).unwrap();
        assert_eq!(rendered(&w), "pt");
    }

    #[test]
    fn test_ltr_and_rtl_agree_on_symmetric_rule() {
        let reg = voicing_registry();
        let mut ltr = word(&["p", "a", "p"]);
        SoundChange::new(voicing_rule(&reg))
            .with_behaviour(Behaviour::LoopNsi)
            .apply(&reg, &mut ltr, None)
            .unwrap();

        let mut rtl = word(&["p", "a", "p"]);
        SoundChange::new(voicing_rule(&reg))
            .with_order(EvaluationOrder::Rtl)
            .with_behaviour(Behaviour::LoopNsi)
            .apply(&reg, &mut rtl, None)
            .unwrap();

        assert_eq!(rendered(&ltr), rendered(&rtl));
        assert_eq!(rendered(&ltr), "bab");
    }

    #[test]
    fn test_pos_restriction_skips_other_tags() {
        let reg = voicing_registry();
        let sc = SoundChange::new(voicing_rule(&reg)).restrict_to(["noun".to_string()]);

        let mut w = word(&["p", "a"]);
        sc.apply(&reg, &mut w, Some("verb")).unwrap();
        assert_eq!(rendered(&w), "pa");

        sc.apply(&reg, &mut w, Some("noun")).unwrap();
        assert_eq!(rendered(&w), "ba");

        // An untagged word never satisfies a restriction.
        let mut w = word(&["p", "a"]);
        sc.apply(&reg, &mut w, None).unwrap();
        assert_eq!(rendered(&w), "pa");
    }

    #[test]
    fn test_final_boundary_epenthesis() {
        let reg = voicing_registry();
        // insert "i" after word-final "k"
        let rule = Rule::Simple(SimpleRule::new(
            vec![PatternElem::Symbol("k".into()), PatternElem::Boundary],
            vec![
                PatternElem::Symbol("k".into()),
                PatternElem::Symbol("i".into()),
            ],
        ));
        let sc = SoundChange::new(rule);
        let mut w = word(&["a", "k"]);
        sc.apply(&reg, &mut w, None).unwrap();
        assert_eq!(rendered(&w), "aki");
    }
}
