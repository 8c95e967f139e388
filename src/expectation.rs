//! Expectations: deferred judgments paired with their subjects.
//!
//! An [`Expectation`] is a description of work; nothing runs until
//! [`Expectation::evaluate`] forces it. Only the `Single`/`Multi` chains
//! ever invoke matcher logic — every other variant is a pure data carrier
//! for reporting.

use crate::errors::{SpecError, SpecResult};
use crate::match_result::{Junction, MatchResult};
use crate::matcher::BoundMatcher;
use crate::style;
use crate::subject::SubjectHandle;

/// Panic information anchored at the spec method it escaped from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalInfo {
    /// The spec method name.
    pub name: String,
    /// The panic message.
    pub message: String,
    /// Panic site file, when captured.
    pub file: String,
    /// Panic site line.
    pub line: u32,
}

/// Outcome of forcing an expectation.
#[derive(Debug, Clone)]
pub enum ExpectationResult {
    /// One bound matcher applied to one subject.
    Single(MatchResult),
    /// Two results combined with a boolean operator.
    Multi {
        op: Junction,
        left: Box<ExpectationResult>,
        right: Box<ExpectationResult>,
    },
    /// Trivial success (unsafe carriers and the identity element).
    Trivial,
    /// An intentionally skipped spec method.
    Pending,
    /// A spec method panicked.
    Fatal(FatalInfo),
    /// An unsafe assertion signalled failure inside the method.
    FailedUnsafe { report: Vec<String> },
}

impl ExpectationResult {
    /// Whether the expectation held.
    pub fn success(&self) -> bool {
        match self {
            ExpectationResult::Single(result) => result.success(),
            ExpectationResult::Multi { op, left, right } => {
                op.combine(left.success(), right.success())
            }
            ExpectationResult::Trivial => true,
            ExpectationResult::Pending
            | ExpectationResult::Fatal(_)
            | ExpectationResult::FailedUnsafe { .. } => false,
        }
    }

    /// Whether the expectation failed.
    pub fn failure(&self) -> bool {
        !self.success()
    }

    /// Whether this is the distinct pending outcome.
    pub fn is_pending(&self) -> bool {
        matches!(self, ExpectationResult::Pending)
    }

    /// Report lines; `Multi` concatenates left-then-right regardless of
    /// evaluation order.
    pub fn report_lines(&self) -> Vec<String> {
        match self {
            ExpectationResult::Single(result) => result.report_lines(),
            ExpectationResult::Multi { left, right, .. } => {
                let mut lines = left.report_lines();
                lines.extend(right.report_lines());
                lines
            }
            ExpectationResult::Trivial => vec![],
            ExpectationResult::Pending => vec!["pending".to_string()],
            ExpectationResult::Fatal(info) => {
                let frame = format!("at {}:{} in {}", info.file, info.line, info.name);
                let detail = style::red(&format!("panicked: {}", info.message));
                let mut out = vec!["fatal error:".to_string()];
                out.extend(style::indent(vec![frame, detail]));
                out
            }
            ExpectationResult::FailedUnsafe { report } => {
                let mut out = vec!["unsafe spec failed:".to_string()];
                out.extend(style::indent(report.clone()));
                out
            }
        }
    }

    /// The report joined into one string.
    pub fn report(&self) -> String {
        self.report_lines().join("\n")
    }
}

/// A deferred judgment.
#[derive(Debug, Clone)]
pub enum Expectation {
    /// One bound matcher against one subject.
    Single {
        matcher: BoundMatcher,
        subject: SubjectHandle,
    },
    /// Algebraic composition; repeated combination right-associates.
    Multi {
        left: Box<Expectation>,
        right: Box<Expectation>,
        op: Junction,
    },
    /// Trivial success carrier produced after an eager unsafe assertion
    /// succeeded.
    Unsafe { lines: Vec<String> },
    /// Identity element, absorbed on first combination in either
    /// direction.
    Empty,
    /// An intentionally skipped method; the body is never invoked.
    Pending,
    /// A recovered panic.
    Fatal(FatalInfo),
    /// A recovered unsafe-assertion signal.
    FailedUnsafe { name: String, report: Vec<String> },
}

impl Expectation {
    /// Force the expectation.
    pub fn evaluate(&self) -> SpecResult<ExpectationResult> {
        match self {
            Expectation::Single { matcher, subject } => {
                let result = matcher
                    .evaluate(subject.as_ref())
                    .map_err(SpecError::Capability)?;
                Ok(ExpectationResult::Single(result))
            }
            Expectation::Multi { left, right, op } => {
                // The operands carry no ordering dependency; report lines
                // stay left-then-right either way.
                let left = left.evaluate()?;
                let right = right.evaluate()?;
                Ok(ExpectationResult::Multi {
                    op: *op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            Expectation::Unsafe { .. } | Expectation::Empty => Ok(ExpectationResult::Trivial),
            Expectation::Pending => Ok(ExpectationResult::Pending),
            Expectation::Fatal(info) => Ok(ExpectationResult::Fatal(info.clone())),
            Expectation::FailedUnsafe { report, .. } => Ok(ExpectationResult::FailedUnsafe {
                report: report.clone(),
            }),
        }
    }

    /// AND composition.
    pub fn and(self, other: Expectation) -> Expectation {
        self.combine(other, Junction::And)
    }

    /// OR composition.
    pub fn or(self, other: Expectation) -> Expectation {
        self.combine(other, Junction::Or)
    }

    fn combine(self, other: Expectation, op: Junction) -> Expectation {
        match (self, other) {
            (Expectation::Empty, other) => other,
            (this, Expectation::Empty) => this,
            // Fold into the existing right branch, keeping the outer
            // operator: a & b & c stores as Multi(a, Multi(b, c)).
            (
                Expectation::Multi {
                    left,
                    right,
                    op: outer,
                },
                other,
            ) => Expectation::Multi {
                left,
                right: Box::new(right.combine(other, op)),
                op: outer,
            },
            (this, other) => Expectation::Multi {
                left: Box::new(this),
                right: Box::new(other),
                op,
            },
        }
    }

    /// Fold a sequence with AND starting from the identity.
    pub fn fold_all(expectations: impl IntoIterator<Item = Expectation>) -> Expectation {
        expectations
            .into_iter()
            .fold(Expectation::Empty, Expectation::and)
    }

    /// Wrap into the spec-method return value.
    pub fn step(self) -> crate::spec::Step {
        Ok(crate::spec::Verdict::Expectation(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectable::expect;
    use crate::matchers::{equal, greater_equal};

    fn passing() -> Expectation {
        expect(1i64).must(equal(1i64))
    }

    fn failing() -> Expectation {
        expect(2i64).must(equal(3i64))
    }

    #[test]
    fn test_single_wraps_the_match_result() {
        let result = passing().evaluate().unwrap();
        assert!(result.success());
        assert_eq!(result.report_lines(), vec!["1 == 1"]);
    }

    #[test]
    fn test_empty_is_the_identity_in_both_directions() {
        for op in [Junction::And, Junction::Or] {
            let absorbed = Expectation::Empty.combine(failing(), op);
            assert!(matches!(absorbed, Expectation::Single { .. }));
            assert!(absorbed.evaluate().unwrap().failure());

            let absorbed = failing().combine(Expectation::Empty, op);
            assert!(matches!(absorbed, Expectation::Single { .. }));
        }
    }

    #[test]
    fn test_combination_right_associates() {
        let chained = passing().and(failing()).and(passing());
        match chained {
            Expectation::Multi { left, right, op } => {
                assert_eq!(op, Junction::And);
                assert!(matches!(*left, Expectation::Single { .. }));
                assert!(matches!(*right, Expectation::Multi { .. }));
            }
            other => panic!("expected multi, got {:?}", other),
        }
    }

    #[test]
    fn test_multi_success_combines_with_the_operator() {
        assert!(passing().and(failing()).evaluate().unwrap().failure());
        assert!(passing().or(failing()).evaluate().unwrap().success());
        assert!(failing().or(failing()).evaluate().unwrap().failure());
    }

    #[test]
    fn test_multi_report_concatenates_left_then_right() {
        let result = failing().and(passing()).evaluate().unwrap();
        assert_eq!(result.report_lines(), vec!["2 /= 3", "1 == 1"]);
    }

    #[test]
    fn test_and_or_are_associative_in_success() {
        let cases = [true, false];
        for &a in &cases {
            for &b in &cases {
                for &c in &cases {
                    let make = |ok: bool| {
                        if ok {
                            passing()
                        } else {
                            failing()
                        }
                    };
                    let left_assoc = make(a).and(make(b)).and(make(c)).evaluate().unwrap();
                    let right_assoc = make(a).and(make(b).and(make(c))).evaluate().unwrap();
                    assert_eq!(left_assoc.success(), right_assoc.success());

                    let left_assoc = make(a).or(make(b)).or(make(c)).evaluate().unwrap();
                    let right_assoc = make(a).or(make(b).or(make(c))).evaluate().unwrap();
                    assert_eq!(left_assoc.success(), right_assoc.success());
                }
            }
        }
    }

    #[test]
    fn test_fold_all_starts_from_the_identity() {
        assert!(Expectation::fold_all(vec![]).evaluate().unwrap().success());
        let folded = Expectation::fold_all(vec![
            expect(3i64).must(greater_equal(2i64)),
            failing(),
        ]);
        let result = folded.evaluate().unwrap();
        assert!(result.failure());
        assert_eq!(result.report_lines(), vec!["3 >= 2", "2 /= 3"]);
    }

    #[test]
    fn test_carrier_variants_never_run_matcher_logic() {
        assert!(matches!(
            Expectation::Pending.evaluate().unwrap(),
            ExpectationResult::Pending
        ));
        assert!(Expectation::Empty.evaluate().unwrap().success());
        assert!(Expectation::Unsafe { lines: vec![] }
            .evaluate()
            .unwrap()
            .success());
    }

    #[test]
    fn test_fatal_report_shape() {
        let result = Expectation::Fatal(FatalInfo {
            name: "failure".to_string(),
            message: "too many puppies".to_string(),
            file: "specs.rs".to_string(),
            line: 20,
        })
        .evaluate()
        .unwrap();
        let lines: Vec<String> = result
            .report_lines()
            .iter()
            .map(|l| crate::style::strip(l))
            .collect();
        assert_eq!(
            lines,
            vec![
                "fatal error:",
                " at specs.rs:20 in failure",
                " panicked: too many puppies",
            ]
        );
    }

    #[test]
    fn test_failed_unsafe_report_shape() {
        let result = Expectation::FailedUnsafe {
            name: "failure".to_string(),
            report: vec!["1 < 2".to_string()],
        }
        .evaluate()
        .unwrap();
        assert_eq!(
            result.report_lines(),
            vec!["unsafe spec failed:", " 1 < 2"]
        );
    }
}
