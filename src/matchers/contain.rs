//! Containment: membership and exists-semantics nesting.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::match_result::MatchResult;
use crate::matcher::{BoundMatcher, Chain, IntoTarget, Matcher, Phrasing, Target};
use crate::registry::Guard;
use crate::subject::Subject;

fn has_elements(subject: &dyn Subject) -> bool {
    subject.elements().is_some()
}

fn has_text(subject: &dyn Subject) -> bool {
    subject.as_text().is_some()
}

/// Substring membership for text subjects; the target may be a string or
/// a char.
fn text_contains(subject: &dyn Subject, target: &dyn Subject) -> bool {
    let haystack = match subject.as_text() {
        Some(text) => text,
        None => return false,
    };
    match target.as_text() {
        Some(needle) => haystack.contains(needle),
        None => target
            .as_any()
            .downcast_ref::<char>()
            .map_or(false, |c| haystack.contains(*c)),
    }
}

fn element_contains(subject: &dyn Subject, target: &dyn Subject) -> bool {
    subject
        .elements()
        .map_or(false, |elements| elements.iter().any(|e| e.eq_subject(target)))
}

static CONTAIN: Lazy<Arc<Matcher>> = Lazy::new(|| {
    Matcher::new(
        "contain",
        Phrasing::templates("`{}` contains `{}`", "`{}` does not contain `{}`"),
    )
    .predicate(Guard::satisfies("has text", has_text), text_contains)
    .predicate(Guard::satisfies("has elements", has_elements), element_contains)
    .nesting(
        Guard::satisfies("has elements", has_elements),
        |subject, nested, name| {
            let elements = subject.elements().unwrap_or_default();
            let children = elements
                .iter()
                .map(|element| nested.evaluate(element.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(MatchResult::Exists {
                description: name.to_string(),
                children,
            })
        },
    )
    .shared()
});

/// The target is a member of the subject: substring membership for text,
/// element membership for containers. A nested matcher applies to every
/// element with exists semantics.
pub fn contain(target: impl IntoTarget) -> BoundMatcher {
    CONTAIN.bind(target)
}

/// The AND-a-containment-check chain implementation shared by the
/// type-check and variant matchers.
pub(crate) fn chain_contain() -> Chain {
    Arc::new(|bound: &BoundMatcher, target: Target| {
        bound.clone().and(CONTAIN.bind_target(target))
    })
}
