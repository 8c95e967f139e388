//! Runtime type checks.

use std::any::TypeId;
use std::sync::Arc;

use crate::matcher::{BoundMatcher, Matcher, Phrasing, Target};
use crate::matchers::contain::chain_contain;
use crate::registry::Guard;
use crate::subject::TypeName;

/// The subject's runtime type is `T`.
///
/// Available for every subject via a universal predicate. The binding
/// chains: `have_type::<Foo>().chain(x)` additionally checks that the
/// subject contains `x`.
pub fn have_type<T: 'static>() -> BoundMatcher {
    let claim = TypeName::of::<T>();
    // Generic over the claimed type, so the prototype cannot live in a
    // static; it is still built once per binding.
    let matcher = Matcher::new(
        "have_type",
        Phrasing::templates("`{}` is a `{}`", "`{}` is not a `{}`"),
    )
    .tagged(TypeId::of::<T>())
    .predicate(Guard::Universal, |subject, target| {
        target
            .as_any()
            .downcast_ref::<TypeName>()
            .map_or(false, |claim| subject.as_any().type_id() == claim.id())
    })
    .chain(Guard::Universal, {
        let extend = chain_contain();
        move |bound, other| extend(bound, other)
    })
    .shared();
    matcher.bind_target(Target::Value(Arc::new(claim)))
}
