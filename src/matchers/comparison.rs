//! The comparison family: equality and ordering checks.
//!
//! Messages render as `<subject> <op> <target>`, where the operator is
//! the success symbol on success and the failure symbol otherwise
//! (`3 >= 2`, but `1 < 2` when `greater_equal(2)` fails on 1).

use std::cmp::Ordering;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::matcher::{BoundMatcher, IntoTarget, Matcher, Phrasing};
use crate::registry::Guard;
use crate::subject::Subject;

fn comparable(subject: &dyn Subject) -> bool {
    subject.as_int().is_some() || subject.as_float().is_some() || subject.as_text().is_some()
}

fn comparison(
    name: &'static str,
    op_success: &'static str,
    op_failure: &'static str,
    guard: Guard,
    check: fn(&dyn Subject, &dyn Subject) -> bool,
) -> Arc<Matcher> {
    Matcher::new(
        name,
        Phrasing::custom(move |success, subject, target| {
            let op = if success { op_success } else { op_failure };
            vec![format!("{} {} {}", subject.describe(), op, target.describe())]
        }),
    )
    .predicate(guard, check)
    .shared()
}

fn ordering(subject: &dyn Subject, target: &dyn Subject) -> Option<Ordering> {
    subject.compare(target)
}

static EQUAL: Lazy<Arc<Matcher>> = Lazy::new(|| {
    comparison("equal", "==", "/=", Guard::Universal, |s, t| s.eq_subject(t))
});

static NOT_EQUAL: Lazy<Arc<Matcher>> = Lazy::new(|| {
    comparison("not_equal", "/=", "==", Guard::Universal, |s, t| !s.eq_subject(t))
});

static GREATER_EQUAL: Lazy<Arc<Matcher>> = Lazy::new(|| {
    comparison(
        "greater_equal",
        ">=",
        "<",
        Guard::satisfies("comparable", comparable),
        |s, t| matches!(ordering(s, t), Some(Ordering::Greater | Ordering::Equal)),
    )
});

static GREATER: Lazy<Arc<Matcher>> = Lazy::new(|| {
    comparison(
        "greater",
        ">",
        "<=",
        Guard::satisfies("comparable", comparable),
        |s, t| matches!(ordering(s, t), Some(Ordering::Greater)),
    )
});

static LESS_EQUAL: Lazy<Arc<Matcher>> = Lazy::new(|| {
    comparison(
        "less_equal",
        "<=",
        ">",
        Guard::satisfies("comparable", comparable),
        |s, t| matches!(ordering(s, t), Some(Ordering::Less | Ordering::Equal)),
    )
});

static LESS: Lazy<Arc<Matcher>> = Lazy::new(|| {
    comparison(
        "less",
        "<",
        ">=",
        Guard::satisfies("comparable", comparable),
        |s, t| matches!(ordering(s, t), Some(Ordering::Less)),
    )
});

/// Subject equals target.
pub fn equal(target: impl IntoTarget) -> BoundMatcher {
    EQUAL.bind(target)
}

/// Alias for [`equal`].
pub fn eq(target: impl IntoTarget) -> BoundMatcher {
    equal(target)
}

/// Subject differs from target.
pub fn not_equal(target: impl IntoTarget) -> BoundMatcher {
    NOT_EQUAL.bind(target)
}

/// Alias for [`not_equal`].
pub fn ne(target: impl IntoTarget) -> BoundMatcher {
    not_equal(target)
}

/// Subject is at least the target.
pub fn greater_equal(target: impl IntoTarget) -> BoundMatcher {
    GREATER_EQUAL.bind(target)
}

/// Alias for [`greater_equal`].
pub fn ge(target: impl IntoTarget) -> BoundMatcher {
    greater_equal(target)
}

/// Subject exceeds the target.
pub fn greater(target: impl IntoTarget) -> BoundMatcher {
    GREATER.bind(target)
}

/// Alias for [`greater`].
pub fn gt(target: impl IntoTarget) -> BoundMatcher {
    greater(target)
}

/// Subject is at most the target.
pub fn less_equal(target: impl IntoTarget) -> BoundMatcher {
    LESS_EQUAL.bind(target)
}

/// Alias for [`less_equal`].
pub fn le(target: impl IntoTarget) -> BoundMatcher {
    less_equal(target)
}

/// Subject is below the target.
pub fn less(target: impl IntoTarget) -> BoundMatcher {
    LESS.bind(target)
}

/// Alias for [`less`].
pub fn lt(target: impl IntoTarget) -> BoundMatcher {
    less(target)
}
