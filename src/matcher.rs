//! Matchers and their bound forms.
//!
//! A [`Matcher`] is a stateless named judgment: a display name, a
//! [`Phrasing`] for message generation, and one capability table per
//! capability kind. Binding it to a target yields a [`BoundMatcher`] — a
//! function from subject to [`MatchResult`]. A plain-value target makes a
//! *strict* binding (Predicate capability plus phrasing); a bound-matcher
//! target makes a *nested* binding (Nesting capability). Bound matchers
//! compose with [`BoundMatcher::and`] / [`BoundMatcher::or`] into flat
//! aggregates, and strict bindings extend with [`BoundMatcher::chain`].

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::errors::CapabilityError;
use crate::match_result::{Junction, MatchResult};
use crate::registry::{Capabilities, Guard};
use crate::subject::{Subject, SubjectHandle};

/// Predicate capability: a direct check of subject against target.
pub type Predicate = Arc<dyn Fn(&dyn Subject, &dyn Subject) -> bool + Send + Sync>;

/// Nesting capability: apply a nested bound matcher over the subject's
/// contents and wrap the result. Receives the matcher's display name for
/// message generation.
pub type Nesting = Arc<
    dyn Fn(&dyn Subject, &BoundMatcher, &str) -> Result<MatchResult, CapabilityError>
        + Send
        + Sync,
>;

/// Chain capability: combine a strict binding with a further match
/// against the same subject.
pub type Chain = Arc<dyn Fn(&BoundMatcher, Target) -> BoundMatcher + Send + Sync>;

/// Message generation for strict matches.
#[derive(Clone)]
pub enum Phrasing {
    /// A success/failure template pair; `{}` holes fill subject then
    /// target via [`Subject::describe`].
    Templates {
        success: &'static str,
        failure: &'static str,
    },
    /// A custom formatter for matchers whose message depends on more than
    /// the two descriptions.
    Custom(Arc<dyn Fn(bool, &dyn Subject, &dyn Subject) -> Vec<String> + Send + Sync>),
}

impl Phrasing {
    /// Template-pair phrasing.
    pub fn templates(success: &'static str, failure: &'static str) -> Phrasing {
        Phrasing::Templates { success, failure }
    }

    /// Custom-formatter phrasing.
    pub fn custom(
        format: impl Fn(bool, &dyn Subject, &dyn Subject) -> Vec<String> + Send + Sync + 'static,
    ) -> Phrasing {
        Phrasing::Custom(Arc::new(format))
    }

    /// Produce the message lines for one strict match.
    pub fn format(&self, success: bool, subject: &dyn Subject, target: &dyn Subject) -> Vec<String> {
        match self {
            Phrasing::Templates {
                success: ok,
                failure: no,
            } => {
                let template = if success { ok } else { no };
                vec![fill(template, &[subject.describe(), target.describe()])]
            }
            Phrasing::Custom(format) => format(success, subject, target),
        }
    }
}

impl fmt::Debug for Phrasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phrasing::Templates { success, failure } => f
                .debug_struct("Templates")
                .field("success", success)
                .field("failure", failure)
                .finish(),
            Phrasing::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Replace successive `{}` holes with the given arguments.
fn fill(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut next = 0;
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match args.get(next) {
            Some(arg) => out.push_str(arg),
            None => out.push_str("{}"),
        }
        next += 1;
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

/// What a matcher is bound to.
#[derive(Clone, Debug)]
pub enum Target {
    /// A plain value: the binding is strict.
    Value(SubjectHandle),
    /// Another bound matcher: the binding is nested.
    Matcher(Box<BoundMatcher>),
}

/// Conversion into a binding target, decided statically.
pub trait IntoTarget {
    fn into_target(self) -> Target;
}

impl<T: Subject> IntoTarget for T {
    fn into_target(self) -> Target {
        Target::Value(Arc::new(self))
    }
}

impl IntoTarget for BoundMatcher {
    fn into_target(self) -> Target {
        Target::Matcher(Box::new(self))
    }
}

/// A named judgment over a subject-type domain.
///
/// Built once (the built-ins live in `once_cell` statics) and bound per
/// use. Cloning is shallow; the capability implementations are shared.
#[derive(Clone)]
pub struct Matcher {
    name: &'static str,
    tag: Option<TypeId>,
    phrasing: Phrasing,
    predicate: Capabilities<Predicate>,
    nesting: Capabilities<Nesting>,
    chain: Capabilities<Chain>,
}

impl Matcher {
    /// A matcher with empty capability tables.
    pub fn new(name: &'static str, phrasing: Phrasing) -> Matcher {
        Matcher {
            name,
            tag: None,
            phrasing,
            predicate: Capabilities::new("Predicate"),
            nesting: Capabilities::new("Nesting"),
            chain: Capabilities::new("Chain"),
        }
    }

    /// Declare the matcher's type tag, the key for chain lookups.
    pub fn tagged(mut self, tag: TypeId) -> Matcher {
        self.tag = Some(tag);
        self
    }

    /// Register a Predicate implementation.
    pub fn predicate(
        mut self,
        guard: Guard,
        check: impl Fn(&dyn Subject, &dyn Subject) -> bool + Send + Sync + 'static,
    ) -> Matcher {
        self.predicate.register(guard, Arc::new(check));
        self
    }

    /// Register a Nesting implementation.
    pub fn nesting(
        mut self,
        guard: Guard,
        apply: impl Fn(&dyn Subject, &BoundMatcher, &str) -> Result<MatchResult, CapabilityError>
            + Send
            + Sync
            + 'static,
    ) -> Matcher {
        self.nesting.register(guard, Arc::new(apply));
        self
    }

    /// Register a Chain implementation.
    pub fn chain(
        mut self,
        guard: Guard,
        extend: impl Fn(&BoundMatcher, Target) -> BoundMatcher + Send + Sync + 'static,
    ) -> Matcher {
        self.chain.register(guard, Arc::new(extend));
        self
    }

    /// Finish construction for shared use.
    pub fn shared(self) -> Arc<Matcher> {
        Arc::new(self)
    }

    /// The matcher's display name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bind to a target, producing a strict or nested binding per the
    /// target kind.
    pub fn bind(&self, target: impl IntoTarget) -> BoundMatcher {
        self.bind_target(target.into_target())
    }

    /// Bind to an already-converted target.
    pub fn bind_target(&self, target: Target) -> BoundMatcher {
        let matcher = Arc::new(self.clone());
        match target {
            Target::Value(value) => BoundMatcher::Strict {
                matcher,
                target: value,
            },
            Target::Matcher(inner) => BoundMatcher::Nested { matcher, inner },
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher").field("name", &self.name).finish()
    }
}

/// A matcher bound to a target: a function from subject to
/// [`MatchResult`].
#[derive(Clone, Debug)]
pub enum BoundMatcher {
    /// Plain-value target; evaluation applies the Predicate capability.
    Strict {
        matcher: Arc<Matcher>,
        target: SubjectHandle,
    },
    /// Bound-matcher target; evaluation applies the Nesting capability.
    Nested {
        matcher: Arc<Matcher>,
        inner: Box<BoundMatcher>,
    },
    /// AND/OR composition holding the flat operand list.
    Aggregate {
        op: Junction,
        operands: Vec<BoundMatcher>,
    },
    /// Produced by a failed chain lookup; evaluation reports the error.
    Invalid(CapabilityError),
}

impl BoundMatcher {
    /// Apply to a subject.
    ///
    /// Capability lookup failures are run-level errors, not match
    /// failures — except a missing Nesting implementation, which folds to
    /// the always-failing [`MatchResult::BadNested`].
    pub fn evaluate(&self, subject: &dyn Subject) -> Result<MatchResult, CapabilityError> {
        match self {
            BoundMatcher::Strict { matcher, target } => {
                let check = matcher.predicate.lookup_or(subject, matcher.name)?;
                let success = check(subject, target.as_ref());
                Ok(MatchResult::Simple {
                    success,
                    lines: matcher.phrasing.format(success, subject, target.as_ref()),
                })
            }
            BoundMatcher::Nested { matcher, inner } => match matcher.nesting.lookup(subject) {
                Some(apply) => apply(subject, inner, matcher.name),
                None => Ok(MatchResult::BadNested {
                    matcher: matcher.name.to_string(),
                }),
            },
            BoundMatcher::Aggregate { op, operands } => {
                let children = operands
                    .iter()
                    .map(|operand| operand.evaluate(subject))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(MatchResult::Aggregate { op: *op, children })
            }
            BoundMatcher::Invalid(error) => Err(error.clone()),
        }
    }

    /// AND composition; aggregates with a matching combinator flatten.
    pub fn and(self, other: BoundMatcher) -> BoundMatcher {
        self.compose(other, Junction::And)
    }

    /// OR composition; aggregates with a matching combinator flatten.
    pub fn or(self, other: BoundMatcher) -> BoundMatcher {
        self.compose(other, Junction::Or)
    }

    fn compose(self, other: BoundMatcher, op: Junction) -> BoundMatcher {
        let mut operands = match self {
            BoundMatcher::Aggregate {
                op: own,
                operands,
            } if own == op => operands,
            first => vec![first],
        };
        match other {
            BoundMatcher::Aggregate {
                op: theirs,
                operands: more,
            } if theirs == op => operands.extend(more),
            second => operands.push(second),
        }
        BoundMatcher::Aggregate { op, operands }
    }

    /// Extend a strict binding through its matcher's Chain capability.
    ///
    /// The built-in chain implementation ANDs a containment check against
    /// the same subject, so `be_ok().chain(5)` first checks "is Ok" then
    /// checks the contained value. A missing chain capability, or a chain
    /// on a non-strict binding, yields [`BoundMatcher::Invalid`].
    pub fn chain(self, other: impl IntoTarget) -> BoundMatcher {
        match &self {
            BoundMatcher::Strict { matcher, .. } => {
                match matcher.chain.lookup_tag(matcher.tag) {
                    Some(extend) => extend(&self, other.into_target()),
                    None => BoundMatcher::Invalid(CapabilityError::NoChain {
                        matcher: matcher.name.to_string(),
                    }),
                }
            }
            _ => BoundMatcher::Invalid(CapabilityError::NoChain {
                matcher: self.display_name(),
            }),
        }
    }

    /// Display name for error messages.
    pub fn display_name(&self) -> String {
        match self {
            BoundMatcher::Strict { matcher, .. } | BoundMatcher::Nested { matcher, .. } => {
                matcher.name.to_string()
            }
            BoundMatcher::Aggregate { op, .. } => match op {
                Junction::And => "and".to_string(),
                Junction::Or => "or".to_string(),
            },
            BoundMatcher::Invalid(_) => "invalid".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equals() -> Arc<Matcher> {
        Matcher::new(
            "equal",
            Phrasing::templates("{} == {}", "{} /= {}"),
        )
        .predicate(Guard::Universal, |subject, target| {
            subject.eq_subject(target)
        })
        .shared()
    }

    #[test]
    fn test_fill_replaces_successive_holes() {
        assert_eq!(
            fill("`{}` contains `{}`", &["abc".to_string(), "b".to_string()]),
            "`abc` contains `b`"
        );
        assert_eq!(fill("no holes", &["x".to_string()]), "no holes");
        assert_eq!(fill("`{}` is `Some`", &["Some(1)".to_string()]), "`Some(1)` is `Some`");
    }

    #[test]
    fn test_strict_evaluation_formats_from_templates() {
        let bound = equals().bind(3i64);
        let pass = bound.evaluate(&3i64).unwrap();
        assert!(pass.success());
        assert_eq!(pass.report_lines(), vec!["3 == 3"]);

        let fail = bound.evaluate(&4i64).unwrap();
        assert!(fail.failure());
        assert_eq!(fail.report_lines(), vec!["4 /= 3"]);
    }

    #[test]
    fn test_repeated_evaluation_is_pure() {
        let bound = equals().bind(3i64);
        let first = bound.evaluate(&4i64).unwrap();
        let second = bound.evaluate(&4i64).unwrap();
        assert_eq!(first.success(), second.success());
        assert_eq!(first.report_lines(), second.report_lines());
    }

    #[test]
    fn test_missing_predicate_is_a_capability_error() {
        let narrow = Matcher::new("narrow", Phrasing::templates("{}", "{}"))
            .predicate(Guard::exact::<String>(), |s, t| s.eq_subject(t))
            .shared();
        let err = narrow.bind(3i64).evaluate(&3i64).unwrap_err();
        assert!(matches!(err, CapabilityError::NoCapability { .. }));
    }

    #[test]
    fn test_missing_nesting_folds_to_bad_nested() {
        let m = equals();
        let nested = m.bind(m.bind(3i64));
        let result = nested.evaluate(&3i64).unwrap();
        assert!(result.failure());
        assert_eq!(
            result.report_lines(),
            vec!["`equal` cannot take nested matchers"]
        );
    }

    #[test]
    fn test_and_aggregate_flattens_operands() {
        let m = equals();
        let composed = m.bind(1i64).and(m.bind(2i64)).and(m.bind(3i64));
        match &composed {
            BoundMatcher::Aggregate { op, operands } => {
                assert_eq!(*op, Junction::And);
                assert_eq!(operands.len(), 3);
            }
            other => panic!("expected aggregate, got {:?}", other),
        }
    }

    #[test]
    fn test_aggregate_evaluates_operands_in_order() {
        let m = equals();
        let composed = m.bind(3i64).and(m.bind(4i64));
        let result = composed.evaluate(&3i64).unwrap();
        assert!(result.failure());
        assert_eq!(result.report_lines(), vec!["3 /= 4"]);

        let either = m.bind(3i64).or(m.bind(4i64));
        assert!(either.evaluate(&4i64).unwrap().success());
    }

    #[test]
    fn test_chain_without_capability_is_invalid() {
        let chained = equals().bind(3i64).chain(4i64);
        assert!(matches!(&chained, BoundMatcher::Invalid(_)));
        let err = chained.evaluate(&3i64).unwrap_err();
        assert_eq!(
            err,
            CapabilityError::NoChain {
                matcher: "equal".to_string()
            }
        );
    }
}
