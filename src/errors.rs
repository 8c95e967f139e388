//! Error types for the spec engine.
//!
//! Three families of failure exist and must not be confused: a failing
//! match is ordinary data ([`crate::MatchResult`]), an unsafe assertion
//! signals [`ExpectationFailed`] out of the spec method, and everything in
//! [`SpecError`] is a run-level problem that fails the whole location.

use thiserror::Error;

/// Capability dispatch failures.
///
/// Raised when no registered implementation of a capability matches a
/// subject's runtime type. This indicates matcher misuse, not a test
/// failure, and propagates as a run-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// No guard in the capability table admitted the subject.
    #[error("no `{capability}` capability of matcher `{matcher}` matches subject type `{subject_type}`")]
    NoCapability {
        capability: &'static str,
        matcher: String,
        subject_type: String,
    },

    /// The matcher carries no chain capability for its type tag.
    #[error("matcher `{matcher}` does not support chaining")]
    NoChain { matcher: String },
}

/// Run-level errors for one spec location.
///
/// These fail the whole run of their location; other locations in the same
/// invocation are unaffected.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The spec type has no doc text and is not marked `ALL_SPECS`.
    #[error("spec `{name}` has no doc text")]
    MissingDoc { name: String },

    /// A doc marker names a method absent from the method table.
    #[error("spec class `{class}` does not define a spec `{method}`")]
    UndefinedMethod { class: String, method: String },

    /// A method of a non-unsafe spec returned no expectation.
    #[error("spec `{class}` method `{method}` did not return an expectation")]
    NoExpectation { class: String, method: String },

    /// The spec type's constructor panicked.
    #[error("failed to construct spec `{name}`: {message}")]
    Construct { name: String, message: String },

    /// The config file exists but cannot be read or parsed.
    #[error("failed to load config {path}: {message}")]
    Config { path: String, message: String },

    /// Capability dispatch failed while evaluating an expectation.
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// Result type for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// The structured unsafe-assertion signal.
///
/// Returned by the eager [`crate::verify`] path when the match fails. Spec
/// methods abort via `?`; the runner catches it immediately around the
/// method invocation and converts it to a failed-unsafe result. It must not
/// leak past the runner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsafe expectation failed: {}", report.join("; "))]
pub struct ExpectationFailed {
    /// Report lines of the failing match.
    pub report: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_capability_display() {
        let err = CapabilityError::NoCapability {
            capability: "Predicate",
            matcher: "contain".to_string(),
            subject_type: "i64".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no `Predicate` capability of matcher `contain` matches subject type `i64`"
        );
    }

    #[test]
    fn test_undefined_method_display() {
        let err = SpecError::UndefinedMethod {
            class: "Simple".to_string(),
            method: "missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "spec class `Simple` does not define a spec `missing`"
        );
    }

    #[test]
    fn test_capability_error_converts() {
        let err: SpecError = CapabilityError::NoChain {
            matcher: "forall".to_string(),
        }
        .into();
        assert!(matches!(err, SpecError::Capability(_)));
    }
}
