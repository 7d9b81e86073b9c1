//! Pattern AST types.

use soundlaw_core::{ClassId, ErrorKind, FeatureId, LoadError, LoadResult};
use soundlaw_registry::{PhonemeSpec, Registry};

/// A pattern is an ordered sequence of elements.
pub type Pattern = Vec<PatternElem>;

/// Key identifying a matcher binding: class (None = wildcard) plus
/// label (0 = unlabelled).
pub type MatcherKey = (Option<ClassId>, u32);

/// One element of a match-string.
#[derive(Debug, Clone)]
pub enum PatternElem {
    /// A literal phoneme symbol; matches by name.
    Symbol(String),
    /// A word-boundary marker.
    Boundary,
    /// A class/constraint matcher.
    Matcher(CharMatcher),
    /// A fully concrete phoneme spec; matches by feature-equality.
    /// Appears in environments after parsing.
    Spec(PhonemeSpec),
    /// Ordered alternatives; first successful one wins.
    Alternation(Alternation),
    /// Bounded or unbounded repetition of a sub-pattern.
    Repeat(Repeat),
}

impl PatternElem {
    /// Whether this element consumes exactly one word segment.
    pub fn is_single(&self) -> bool {
        !matches!(self, PatternElem::Alternation(_) | PatternElem::Repeat(_))
    }
}

/// An ordered list of alternative sub-patterns.
#[derive(Debug, Clone)]
pub struct Alternation {
    pub options: Vec<Pattern>,
}

/// A sub-pattern with an inclusive [min, max] repetition count.
/// `max` of None means unbounded.
#[derive(Debug, Clone)]
pub struct Repeat {
    pub pattern: Pattern,
    pub min: usize,
    pub max: Option<usize>,
}

/// Comparator used by matcher constraints. Relational comparators are
/// only valid on ordered features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Comparator {
    pub fn compare(self, value: usize, operand: usize) -> bool {
        match self {
            Comparator::Eq => value == operand,
            Comparator::Ne => value != operand,
            Comparator::Lt => value < operand,
            Comparator::Gt => value > operand,
            Comparator::Le => value <= operand,
            Comparator::Ge => value >= operand,
        }
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Comparator::Lt | Comparator::Gt | Comparator::Le | Comparator::Ge
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
            Comparator::Lt => "<",
            Comparator::Gt => ">",
            Comparator::Le => "<=",
            Comparator::Ge => ">=",
        }
    }
}

/// A constraint operand: a literal instance index, or a reference to
/// another matcher's bound value for the same feature (a dependent
/// constraint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Literal(usize),
    Matcher(MatcherKey),
}

/// A single feature constraint on a matcher.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub feature: FeatureId,
    pub comparator: Comparator,
    pub operands: Vec<Operand>,
}

impl Constraint {
    pub fn new(feature: FeatureId, comparator: Comparator, operands: Vec<Operand>) -> Self {
        Self {
            feature,
            comparator,
            operands,
        }
    }

    /// Whether the comparison holds between a feature value and the
    /// already-evaluated operand values. `Eq` is satisfied by any
    /// operand (set membership); every other comparator must hold
    /// against all operands.
    pub fn holds(&self, value: usize, operand_values: &[usize]) -> bool {
        match self.comparator {
            Comparator::Eq => operand_values.iter().any(|&o| value == o),
            c => operand_values.iter().all(|&o| c.compare(value, o)),
        }
    }

    /// Human-readable rendering for diagnostics.
    pub fn describe(&self, registry: &Registry) -> String {
        let feature_name = registry
            .feature(self.feature)
            .map(|f| f.name.as_str())
            .unwrap_or("?");
        let operands: Vec<String> = self
            .operands
            .iter()
            .map(|op| match op {
                Operand::Literal(i) => registry
                    .feature(self.feature)
                    .and_then(|f| f.instances.get(*i))
                    .cloned()
                    .unwrap_or_else(|| i.to_string()),
                Operand::Matcher((class, label)) => describe_key(registry, *class, *label),
            })
            .collect();
        format!(
            "{}{}{}",
            feature_name,
            self.comparator.symbol(),
            operands.join("|")
        )
    }
}

/// The body of a matcher: either a constraint set or an explicit
/// enumeration of allowed phonemes.
#[derive(Debug, Clone)]
pub enum MatcherBody {
    Constraints(Vec<Constraint>),
    Enumeration(Vec<String>),
}

/// A pattern element that matches any phoneme of a class satisfying
/// constraints, optionally binding it to a label for later reuse.
#[derive(Debug, Clone)]
pub struct CharMatcher {
    /// Class restriction; None matches any class.
    pub class: Option<ClassId>,
    /// Binding label; 0 means unlabelled (unconstrained single use).
    pub label: u32,
    pub body: MatcherBody,
}

impl CharMatcher {
    /// An unlabelled, unconstrained matcher for a class.
    pub fn unlabelled(class: Option<ClassId>) -> Self {
        Self {
            class,
            label: 0,
            body: MatcherBody::Constraints(Vec::new()),
        }
    }

    /// A labelled matcher. An explicit label of zero is reserved for
    /// unlabelled matchers and rejected at load time.
    pub fn labelled(class: Option<ClassId>, label: u32) -> LoadResult<Self> {
        if label == 0 {
            return Err(LoadError::new(ErrorKind::ExplicitLabelZero));
        }
        Ok(Self {
            class,
            label,
            body: MatcherBody::Constraints(Vec::new()),
        })
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.body = MatcherBody::Constraints(constraints);
        self
    }

    pub fn with_enumeration(mut self, phonemes: Vec<String>) -> Self {
        self.body = MatcherBody::Enumeration(phonemes);
        self
    }

    pub fn key(&self) -> MatcherKey {
        (self.class, self.label)
    }

    pub fn is_enumeration(&self) -> bool {
        matches!(self.body, MatcherBody::Enumeration(_))
    }

    pub fn constraints(&self) -> &[Constraint] {
        match &self.body {
            MatcherBody::Constraints(cs) => cs,
            MatcherBody::Enumeration(_) => &[],
        }
    }

    /// Feature ids explicitly constrained by this matcher. Prior
    /// bindings under the same key need not agree on these.
    pub fn constrains(&self, feature: FeatureId) -> bool {
        self.constraints().iter().any(|c| c.feature == feature)
    }

    /// Human-readable rendering for diagnostics.
    pub fn describe(&self, registry: &Registry) -> String {
        let mut s = describe_key(registry, self.class, self.label);
        match &self.body {
            MatcherBody::Constraints(cs) if !cs.is_empty() => {
                let parts: Vec<String> = cs.iter().map(|c| c.describe(registry)).collect();
                s.truncate(s.len() - 1);
                s.push('|');
                s.push_str(&parts.join(","));
                s.push(')');
            }
            MatcherBody::Enumeration(names) => {
                s.push('{');
                s.push_str(&names.join(" "));
                s.push('}');
            }
            _ => {}
        }
        s
    }
}

fn describe_key(registry: &Registry, class: Option<ClassId>, label: u32) -> String {
    let class_name = class
        .and_then(|c| registry.class(c))
        .map(|c| c.name.as_str())
        .unwrap_or("*");
    if label == 0 {
        format!("$({})", class_name)
    } else {
        format!("$({}:{})", class_name, label)
    }
}
