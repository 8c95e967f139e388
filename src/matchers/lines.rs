//! Ordered multi-line diffing.
//!
//! Subject and target normalize to line sequences through the lines view;
//! a mismatch renders the minimal edit script between them, reproducible
//! from the two sequences alone.

use std::sync::Arc;

use once_cell::sync::Lazy;
use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::match_result::MatchResult;
use crate::matcher::{BoundMatcher, IntoTarget, Matcher, Phrasing};
use crate::registry::Guard;
use crate::style;
use crate::subject::Subject;

fn has_lines(subject: &dyn Subject) -> bool {
    subject.text_lines().is_some()
}

/// Render the edit script between two line sequences.
///
/// Removed lines carry their 1-based source index right-aligned to the
/// width of the largest index; inserted lines align under the insertion
/// point, with only the first line of a pure insertion run showing the
/// insertion index. Runs are separated by a divider.
fn lines_mismatch(old: &[String], new: &[String]) -> Vec<String> {
    let pad = old.len().to_string().len();
    let entry = |index: Option<usize>, inserted: bool, line: &str| {
        let sign = if inserted {
            style::green_plus()
        } else {
            style::red_minus()
        };
        let index = match index {
            Some(i) => format!("{:>width$}", i, width = pad),
            None => " ".repeat(pad),
        };
        format!("{} {} {}", sign, style::blue(&index), line)
    };

    let mut runs: Vec<Vec<String>> = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, old, new) {
        let mut run = Vec::new();
        match op {
            DiffOp::Equal { .. } => continue,
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                for offset in 0..old_len {
                    run.push(entry(Some(old_index + offset + 1), false, &old[old_index + offset]));
                }
                for offset in 0..new_len {
                    run.push(entry(None, true, &new[new_index + offset]));
                }
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                for offset in 0..old_len {
                    run.push(entry(Some(old_index + offset + 1), false, &old[old_index + offset]));
                }
            }
            DiffOp::Insert {
                old_index,
                new_index,
                new_len,
            } => {
                for offset in 0..new_len {
                    let index = if offset == 0 { Some(old_index + 1) } else { None };
                    run.push(entry(index, true, &new[new_index + offset]));
                }
            }
        }
        runs.push(run);
    }

    let divider = style::yellow("---");
    let mut body = Vec::new();
    for (i, run) in runs.into_iter().enumerate() {
        if i > 0 {
            body.push(divider.clone());
        }
        body.extend(run);
    }
    let mut out = vec!["Lines differ:".to_string()];
    out.extend(style::indent(body));
    out
}

fn format_lines(success: bool, subject: &dyn Subject, target: &dyn Subject) -> Vec<String> {
    if success {
        return vec!["Lines are equal".to_string()];
    }
    let old = subject.text_lines().unwrap_or_default();
    let new = target.text_lines().unwrap_or_default();
    lines_mismatch(&old, &new)
}

static HAVE_LINES: Lazy<Arc<Matcher>> = Lazy::new(|| {
    Matcher::new("have_lines", Phrasing::custom(format_lines))
        .predicate(Guard::satisfies("has lines", has_lines), |subject, target| {
            subject.text_lines() == target.text_lines()
        })
        .nesting(
            Guard::satisfies("has lines", has_lines),
            |subject, nested, name| {
                let lines = subject.text_lines().unwrap_or_default();
                let children = lines
                    .iter()
                    .map(|line| nested.evaluate(line))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(MatchResult::ForAll {
                    description: name.to_string(),
                    children,
                })
            },
        )
        .shared()
});

/// The subject's lines equal the target's; a mismatch renders the minimal
/// edit script. A nested matcher applies to every line and must hold for
/// all of them.
pub fn have_lines(target: impl IntoTarget) -> BoundMatcher {
    HAVE_LINES.bind(target)
}
