//! Sum-type variant checks for `Option` and `Result` subjects.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::matcher::{BoundMatcher, IntoTarget, Matcher, Phrasing};
use crate::matchers::contain::chain_contain;
use crate::registry::Guard;
use crate::subject::Subject;

fn has_variant(subject: &dyn Subject) -> bool {
    subject.variant().is_some()
}

fn variant_matcher(
    name: &'static str,
    label: &'static str,
    success: &'static str,
    failure: &'static str,
) -> Arc<Matcher> {
    Matcher::new(name, Phrasing::templates(success, failure))
        .predicate(Guard::satisfies("has variant", has_variant), move |subject, _| {
            subject.variant() == Some(label)
        })
        .chain(Guard::Universal, {
            let extend = chain_contain();
            move |bound, other| extend(bound, other)
        })
        .shared()
}

static BE_SOME: Lazy<Arc<Matcher>> = Lazy::new(|| {
    variant_matcher("be_some", "Some", "`{}` is `Some`", "`{}` is not `Some`")
});

static BE_NONE: Lazy<Arc<Matcher>> = Lazy::new(|| {
    variant_matcher("be_none", "None", "`{}` is `None`", "`{}` is not `None`")
});

static BE_OK: Lazy<Arc<Matcher>> =
    Lazy::new(|| variant_matcher("be_ok", "Ok", "`{}` is `Ok`", "`{}` is not `Ok`"));

static BE_ERR: Lazy<Arc<Matcher>> =
    Lazy::new(|| variant_matcher("be_err", "Err", "`{}` is `Err`", "`{}` is not `Err`"));

/// The subject is a `Some`.
pub fn be_some() -> BoundMatcher {
    BE_SOME.bind(())
}

/// The subject is a `Some` containing the target.
pub fn be_some_of(target: impl IntoTarget) -> BoundMatcher {
    be_some().chain(target)
}

/// The subject is a `None`.
pub fn be_none() -> BoundMatcher {
    BE_NONE.bind(())
}

/// The subject is an `Ok`.
pub fn be_ok() -> BoundMatcher {
    BE_OK.bind(())
}

/// The subject is an `Ok` containing the target.
pub fn be_ok_of(target: impl IntoTarget) -> BoundMatcher {
    be_ok().chain(target)
}

/// The subject is an `Err`.
pub fn be_err() -> BoundMatcher {
    BE_ERR.bind(())
}

/// The subject is an `Err` containing the target.
pub fn be_err_of(target: impl IntoTarget) -> BoundMatcher {
    be_err().chain(target)
}
