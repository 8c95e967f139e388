//! Universal quantification over a subject's elements.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::match_result::MatchResult;
use crate::matcher::{BoundMatcher, IntoTarget, Matcher, Phrasing};
use crate::registry::Guard;
use crate::subject::Subject;

fn has_elements(subject: &dyn Subject) -> bool {
    subject.elements().is_some()
}

static FORALL: Lazy<Arc<Matcher>> = Lazy::new(|| {
    Matcher::new(
        "forall",
        Phrasing::templates(
            "all elements of {} are == {}",
            "some elements of {} are /= {}",
        ),
    )
    .predicate(
        Guard::satisfies("has elements", has_elements),
        |subject, target| {
            subject
                .elements()
                .map_or(false, |elements| elements.iter().all(|e| e.eq_subject(target)))
        },
    )
    .nesting(
        Guard::satisfies("has elements", has_elements),
        |subject, nested, name| {
            let elements = subject.elements().unwrap_or_default();
            let children = elements
                .iter()
                .map(|element| nested.evaluate(element.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(MatchResult::ForAll {
                description: name.to_string(),
                children,
            })
        },
    )
    .shared()
});

/// Every element equals the target; a nested matcher applies to every
/// element and must hold for all of them.
pub fn forall(target: impl IntoTarget) -> BoundMatcher {
    FORALL.bind(target)
}
