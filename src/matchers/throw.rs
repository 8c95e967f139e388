//! Exception-raising checks over callable subjects.
//!
//! The subject is a [`Thunk`]; evaluation invokes it and judges what was
//! raised. A panic counts as a raised [`Panicked`] value, so
//! `throws::<Panicked>()` matches panicking thunks.

use std::cell::RefCell;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::match_result::MatchResult;
use crate::matcher::{BoundMatcher, Matcher, Phrasing, Target};
use crate::registry::Guard;
use crate::subject::{Invoked, Panicked, Subject, SubjectHandle, TypeName};

// Invoking is effectful, so the guard tests the type rather than the
// invoke view.
fn callable(subject: &dyn Subject) -> bool {
    subject.as_any().is::<crate::subject::Thunk>()
}

/// Invoke the subject and surface what it raised, if anything.
fn raised(subject: &dyn Subject) -> Option<SubjectHandle> {
    match subject.invoke() {
        Some(Invoked::Completed) | None => None,
        Some(Invoked::Raised(error)) => Some(error),
        Some(Invoked::Panicked(message)) => Some(Arc::new(Panicked { message })),
    }
}

thread_local! {
    // Strict evaluation runs the predicate and then the formatter on the
    // same thread; the invocation outcome crosses between them here so
    // the thunk runs exactly once per evaluation.
    static OUTCOME: RefCell<Option<Option<SubjectHandle>>> = RefCell::new(None);
}

fn format_throw(success: bool, subject: &dyn Subject, target: &dyn Subject) -> Vec<String> {
    let outcome = OUTCOME
        .with(|cell| cell.borrow_mut().take())
        .unwrap_or_else(|| raised(subject));
    let raised_repr = match outcome {
        Some(error) => format!("`{}`", error.type_label()),
        None => "no exception".to_string(),
    };
    if success {
        vec![format!("`{}` raised {}", subject.describe(), raised_repr)]
    } else {
        vec![format!(
            "`{}` raised {} instead of `{}`",
            subject.describe(),
            raised_repr,
            target.describe()
        )]
    }
}

static THROW: Lazy<Arc<Matcher>> = Lazy::new(|| {
    Matcher::new("throw", Phrasing::custom(format_throw))
        .predicate(Guard::satisfies("callable", callable), |subject, target| {
            let outcome = raised(subject);
            let hit = match (&outcome, target.as_any().downcast_ref::<TypeName>()) {
                (Some(error), Some(claim)) => error.as_any().type_id() == claim.id(),
                _ => false,
            };
            OUTCOME.with(|cell| *cell.borrow_mut() = Some(outcome));
            hit
        })
        .nesting(
            Guard::satisfies("callable", callable),
            |subject, nested, _| match raised(subject) {
                None => Ok(MatchResult::Nested {
                    main_success: false,
                    message: format!("`{}` did not raise", subject.describe()),
                    children: vec![],
                }),
                Some(error) => {
                    let child = nested.evaluate(error.as_ref())?;
                    Ok(MatchResult::Nested {
                        main_success: true,
                        message: format!("`{}` raised", subject.describe()),
                        children: vec![child],
                    })
                }
            },
        )
        .shared()
});

/// Invoking the subject raises an error of type `E`.
pub fn throws<E: Subject>() -> BoundMatcher {
    THROW.bind_target(Target::Value(Arc::new(TypeName::of::<E>())))
}

/// Invoking the subject raises, and the raised value satisfies the nested
/// matcher.
pub fn throws_and(nested: BoundMatcher) -> BoundMatcher {
    THROW.bind(nested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::contain;
    use crate::style::strip;
    use crate::subject::Thunk;

    fn raiser() -> Thunk {
        Thunk::new("raiser", || -> Result<(), String> {
            Err("too many puppies".to_string())
        })
    }

    fn quiet() -> Thunk {
        Thunk::infallible("quiet", || {})
    }

    #[test]
    fn test_matches_the_raised_type() {
        let result = throws::<String>().evaluate(&raiser()).unwrap();
        assert!(result.success());
        assert_eq!(result.report_lines(), vec!["`raiser` raised `String`"]);
    }

    #[test]
    fn test_names_what_was_raised_on_mismatch() {
        let result = throws::<Panicked>().evaluate(&raiser()).unwrap();
        assert!(result.failure());
        assert_eq!(
            result.report_lines(),
            vec!["`raiser` raised `String` instead of `Panicked`"]
        );
    }

    #[test]
    fn test_no_exception_case() {
        let result = throws::<String>().evaluate(&quiet()).unwrap();
        assert!(result.failure());
        assert_eq!(
            result.report_lines(),
            vec!["`quiet` raised no exception instead of `String`"]
        );
    }

    #[test]
    fn test_strict_evaluation_invokes_the_thunk_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counted = {
            let calls = Arc::clone(&calls);
            Thunk::new("counted", move || -> Result<(), String> {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("bad".to_string())
            })
        };

        let pass = throws::<String>().evaluate(&counted).unwrap();
        assert!(pass.success());
        assert_eq!(pass.report_lines(), vec!["`counted` raised `String`"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let fail = throws::<Panicked>().evaluate(&counted).unwrap();
        assert_eq!(
            fail.report_lines(),
            vec!["`counted` raised `String` instead of `Panicked`"]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panics_raise_panicked() {
        let thunk = Thunk::infallible("explodes", || panic!("kaboom"));
        assert!(throws::<Panicked>().evaluate(&thunk).unwrap().success());
    }

    #[test]
    fn test_nested_hands_the_error_to_the_matcher() {
        let pass = throws_and(contain("puppies")).evaluate(&raiser()).unwrap();
        assert!(pass.success());
        assert_eq!(
            pass.report_lines()
                .iter()
                .map(|l| strip(l))
                .collect::<Vec<_>>(),
            vec!["`raiser` raised and:", " `too many puppies` contains `puppies`"]
        );

        let fail = throws_and(contain("kittens")).evaluate(&raiser()).unwrap();
        assert!(fail.failure());
        assert_eq!(
            fail.report_lines()
                .iter()
                .map(|l| strip(l))
                .collect::<Vec<_>>(),
            vec![
                "`raiser` raised but:",
                " `too many puppies` does not contain `kittens`"
            ]
        );
    }

    #[test]
    fn test_nested_without_exception() {
        let result = throws_and(contain("x")).evaluate(&quiet()).unwrap();
        assert!(result.failure());
        assert_eq!(result.report_lines(), vec!["`quiet` did not raise"]);
    }
}
