//! Match outcomes: success flags plus report lines.
//!
//! A [`MatchResult`] is immutable once produced. Leaf variants carry their
//! own message; composite variants aggregate children and derive both the
//! success flag and the report from them.

use crate::style;

/// Boolean combinator for aggregated results and expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Junction {
    And,
    Or,
}

impl Junction {
    /// Fold two success flags.
    pub fn combine(self, left: bool, right: bool) -> bool {
        match self {
            Junction::And => left && right,
            Junction::Or => left || right,
        }
    }

    /// Fold any number of success flags (`And` of none is true, `Or` of
    /// none is false).
    pub fn fold(self, flags: impl IntoIterator<Item = bool>) -> bool {
        match self {
            Junction::And => flags.into_iter().all(|f| f),
            Junction::Or => flags.into_iter().any(|f| f),
        }
    }
}

/// Outcome of applying a bound matcher to a subject.
#[derive(Debug, Clone)]
pub enum MatchResult {
    /// Leaf outcome with its message lines.
    Simple { success: bool, lines: Vec<String> },

    /// A main check plus nested children; the message is suffixed with a
    /// conjunction chosen by whether the main check succeeded while the
    /// children did not.
    Nested {
        main_success: bool,
        message: String,
        children: Vec<MatchResult>,
    },

    /// Succeeds when at least one child succeeds.
    Exists {
        description: String,
        children: Vec<MatchResult>,
    },

    /// Succeeds when no child fails.
    ForAll {
        description: String,
        children: Vec<MatchResult>,
    },

    /// Generic boolean fold used by bound-matcher composition.
    Aggregate {
        op: Junction,
        children: Vec<MatchResult>,
    },

    /// A nested matcher was handed to a matcher that cannot take one.
    BadNested { matcher: String },
}

impl MatchResult {
    /// A single-line leaf.
    pub fn simple(success: bool, message: impl Into<String>) -> MatchResult {
        MatchResult::Simple {
            success,
            lines: vec![message.into()],
        }
    }

    /// Whether the match succeeded.
    pub fn success(&self) -> bool {
        match self {
            MatchResult::Simple { success, .. } => *success,
            MatchResult::Nested {
                main_success,
                children,
                ..
            } => *main_success && children.iter().all(MatchResult::success),
            MatchResult::Exists { children, .. } => {
                children.iter().any(MatchResult::success)
            }
            MatchResult::ForAll { children, .. } => {
                children.iter().all(MatchResult::success)
            }
            MatchResult::Aggregate { op, children } => {
                op.fold(children.iter().map(MatchResult::success))
            }
            MatchResult::BadNested { .. } => false,
        }
    }

    /// Whether the match failed.
    pub fn failure(&self) -> bool {
        !self.success()
    }

    /// The report for this outcome, one entry per line.
    pub fn report_lines(&self) -> Vec<String> {
        match self {
            MatchResult::Simple { lines, .. } => lines.clone(),
            MatchResult::Nested {
                main_success,
                message,
                children,
            } => {
                if !main_success {
                    return vec![message.clone()];
                }
                let children_ok = children.iter().all(MatchResult::success);
                let conjunction = if children_ok { "and" } else { "but" };
                let body: Vec<String> = children
                    .iter()
                    .flat_map(MatchResult::report_lines)
                    .collect();
                let mut out = vec![format!("{} {}:", message, conjunction)];
                out.extend(style::indent(body));
                out
            }
            MatchResult::Exists {
                description,
                children,
            } => {
                if self.success() {
                    vec![format!("{} succeeded", description)]
                } else {
                    composite_failure("no elements match", children)
                }
            }
            MatchResult::ForAll {
                description,
                children,
            } => {
                if self.success() {
                    vec![format!("{} succeeded", description)]
                } else {
                    composite_failure("some elements do not match", children)
                }
            }
            MatchResult::Aggregate { children, .. } => {
                // All children on success, the failing subset on failure.
                let selected: Vec<&MatchResult> = if self.success() {
                    children.iter().collect()
                } else {
                    children.iter().filter(|c| c.failure()).collect()
                };
                selected
                    .into_iter()
                    .flat_map(MatchResult::report_lines)
                    .collect()
            }
            MatchResult::BadNested { matcher } => {
                vec![format!("`{}` cannot take nested matchers", matcher)]
            }
        }
    }

    /// The report joined into one string.
    pub fn report(&self) -> String {
        self.report_lines().join("\n")
    }
}

/// Header plus the failing children's reports, indented and colorized
/// yellow per line.
fn composite_failure(header: &str, children: &[MatchResult]) -> Vec<String> {
    let failing: Vec<String> = children
        .iter()
        .filter(|c| c.failure())
        .flat_map(MatchResult::report_lines)
        .map(|line| style::yellow(&line))
        .collect();
    let mut out = vec![format!("{}:", header)];
    out.extend(style::indent(failing));
    out
}
