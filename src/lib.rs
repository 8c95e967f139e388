//! Literate behavior specifications with composable matchers.
//!
//! Spec types carry a doc text whose lines describe behavior; lines
//! ending in a `$method` marker are bound to spec methods. Each method
//! returns an expectation built from matchers, and the runner forces
//! the expectations into a colorized literate report.
//!
//! ## Overview
//!
//! Matchers are capability tables dispatched on the runtime subject:
//! the same `contain` works on text, vectors, and options, and matchers
//! nest (`contain(greater(3))`) wherever a subject exposes elements.
//! Expectations compose with `and`/`or` before evaluation, so a single
//! spec method can express several related assertions in one report
//! line.
//!
//! ## Modules
//!
//! - [`subject`] - The runtime value protocol matchers dispatch on
//! - [`registry`] - Guarded capability tables with specificity ranking
//! - [`matcher`] - Matcher definitions and bound matcher evaluation
//! - [`matchers`] - The built-in matcher set
//! - [`match_result`] - The match-result algebra and its reports
//! - [`expectation`] - Expectation composition and forcing
//! - [`expectable`] - The `expect(..)` / `verify(..)` entry points
//! - [`spec`] - The `Spec` trait and method tables
//! - [`parser`] - The doc-text marker mini-language
//! - [`runner`] - Spec execution, stats, and report rendering
//! - [`config`] - Run settings from `litspec.toml`
//! - [`errors`] - Error types for the spec system
//! - [`style`] - ANSI styling and report indentation helpers

pub mod config;
pub mod errors;
pub mod expectable;
pub mod expectation;
pub mod match_result;
pub mod matcher;
pub mod matchers;
pub mod parser;
pub mod registry;
pub mod runner;
pub mod spec;
pub mod style;
pub mod subject;

mod trap;

// Re-exports for convenient access to core types
pub use config::RunConfig;
pub use errors::{CapabilityError, ExpectationFailed, SpecError, SpecResult};
pub use expectable::{expect, verify, Expectable};
pub use expectation::{Expectation, ExpectationResult, FatalInfo};
pub use match_result::{Junction, MatchResult};
pub use matcher::{BoundMatcher, IntoTarget, Matcher, Phrasing, Target};
pub use parser::{parse_doc, ParsedLine};
pub use registry::{Capabilities, Guard};
pub use runner::{
    format_duration, run_location, Line, ResultLine, RunReport, RunStats, Runner, SpecLocation,
    SpecReport,
};
pub use spec::{MethodTable, Spec, Step, Verdict};
pub use subject::{Invoked, Panicked, Subject, SubjectHandle, Thunk, TypeName};

#[cfg(test)]
mod tests;
