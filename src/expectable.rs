//! Entry points for asserting over a value.
//!
//! [`expect`] starts the deferred path: the returned [`Expectable`] pairs
//! the value with a matcher into an [`Expectation`] the runner forces
//! later. [`verify`] is the eager unsafe path: it evaluates at the call
//! site and signals [`ExpectationFailed`] on failure, so spec methods
//! abort via `?`.

use std::sync::Arc;

use crate::errors::ExpectationFailed;
use crate::expectation::Expectation;
use crate::matcher::BoundMatcher;
use crate::subject::{Subject, SubjectHandle};

/// A value waiting for its matcher.
pub struct Expectable {
    subject: SubjectHandle,
}

impl Expectable {
    /// Defer the judgment of `matcher` over the wrapped value.
    pub fn must(self, matcher: BoundMatcher) -> Expectation {
        Expectation::Single {
            matcher,
            subject: self.subject,
        }
    }
}

/// Wrap a value for a deferred expectation.
pub fn expect(value: impl Subject) -> Expectable {
    Expectable {
        subject: Arc::new(value),
    }
}

/// Assert eagerly at the call site.
///
/// On success the returned trivial expectation lets chaining continue
/// harmlessly; on failure the structured signal carries the failing
/// report. A capability error on this path also fails the assertion,
/// carrying the error text as its report.
pub fn verify(value: impl Subject, matcher: BoundMatcher) -> Result<Expectation, ExpectationFailed> {
    let subject: SubjectHandle = Arc::new(value);
    match matcher.evaluate(subject.as_ref()) {
        Ok(result) if result.success() => Ok(Expectation::Unsafe {
            lines: result.report_lines(),
        }),
        Ok(result) => Err(ExpectationFailed {
            report: result.report_lines(),
        }),
        Err(error) => Err(ExpectationFailed {
            report: vec![error.to_string()],
        }),
    }
}
