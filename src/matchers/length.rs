//! Length checks over sized subjects.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::matcher::{BoundMatcher, IntoTarget, Matcher, Phrasing};
use crate::registry::Guard;
use crate::subject::Subject;

fn has_size(subject: &dyn Subject) -> bool {
    subject.size().is_some()
}

fn format_length(success: bool, subject: &dyn Subject, target: &dyn Subject) -> Vec<String> {
    match subject.size() {
        // Subjects without a size concept fail with a message, never an
        // error.
        None => vec![format!("`{}` has no length", subject.describe())],
        Some(_) if success => vec![format!(
            "length of {} is {}",
            subject.describe(),
            target.describe()
        )],
        Some(actual) => vec![format!(
            "length of {} is {}, not {}",
            subject.describe(),
            actual,
            target.describe()
        )],
    }
}

static HAVE_LENGTH: Lazy<Arc<Matcher>> = Lazy::new(|| {
    Matcher::new("have_length", Phrasing::custom(format_length))
        .predicate(Guard::Universal, |subject, target| {
            match (subject.size(), target.as_int()) {
                (Some(actual), Some(expected)) => actual as i128 == expected,
                _ => false,
            }
        })
        .nesting(Guard::satisfies("has size", has_size), |subject, nested, _| {
            // Pass-through wrap: the nested matcher judges the size
            // itself.
            let size = subject.size().unwrap_or_default();
            nested.evaluate(&size)
        })
        .shared()
});

/// The subject's size equals the target; the nested form feeds the size
/// into a nested numeric matcher unchanged.
pub fn have_length(target: impl IntoTarget) -> BoundMatcher {
    HAVE_LENGTH.bind(target)
}
