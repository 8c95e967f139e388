//! Spec definitions: the trait spec types implement and their method
//! tables.

use crate::errors::ExpectationFailed;
use crate::expectation::Expectation;
use crate::subject::label_of;

/// What a spec method produced.
#[derive(Debug)]
pub enum Verdict {
    /// The normal return: an expectation for the runner to force.
    Expectation(Expectation),
    /// No expectation produced; only meaningful in unsafe-style specs
    /// whose assertions already ran inline.
    Inline,
}

/// Return type of a spec method.
///
/// The `Err` arm is the structured unsafe-assertion signal; `?` on
/// [`crate::verify`] aborts the method with it.
pub type Step = Result<Verdict, ExpectationFailed>;

/// A behavior specification.
///
/// The doc text drives the run: each of its lines is prose or a
/// `<description> $<method>` marker resolved against the method table.
pub trait Spec: Default + 'static {
    /// Unsafe-style marker: methods returning [`Verdict::Inline`] are
    /// implicitly successful because their assertions already ran.
    const UNSAFE: bool = false;

    /// Doc text is optional; lines are synthesized from the method table
    /// when it is empty.
    const ALL_SPECS: bool = false;

    /// The spec's display name.
    fn name() -> &'static str {
        label_of::<Self>()
    }

    /// The literate doc text.
    fn doc() -> &'static str {
        ""
    }

    /// The method table, built once per run.
    fn methods() -> MethodTable<Self>;

    /// Called before each spec method.
    fn setup(&mut self) {}

    /// Called after each spec method's evaluation, regardless of outcome.
    fn teardown(&mut self) {}
}

pub(crate) enum MethodKind {
    Normal,
    Pending,
}

type MethodBody<S> = Box<dyn Fn(&mut S) -> Step + Send + Sync>;

pub(crate) struct MethodEntry<S> {
    pub(crate) name: &'static str,
    pub(crate) kind: MethodKind,
    body: MethodBody<S>,
}

impl<S> MethodEntry<S> {
    pub(crate) fn invoke(&self, instance: &mut S) -> Step {
        (self.body)(instance)
    }
}

/// Ordered name-to-callable table of a spec's methods.
pub struct MethodTable<S> {
    entries: Vec<MethodEntry<S>>,
}

impl<S> MethodTable<S> {
    /// An empty table.
    pub fn new() -> MethodTable<S> {
        MethodTable {
            entries: Vec::new(),
        }
    }

    /// Register a spec method.
    pub fn method(
        mut self,
        name: &'static str,
        body: impl Fn(&mut S) -> Step + Send + Sync + 'static,
    ) -> MethodTable<S> {
        self.entries.push(MethodEntry {
            name,
            kind: MethodKind::Normal,
            body: Box::new(body),
        });
        self
    }

    /// Register a pending method; the body is kept but never called.
    pub fn pending(
        mut self,
        name: &'static str,
        body: impl Fn(&mut S) -> Step + Send + Sync + 'static,
    ) -> MethodTable<S> {
        self.entries.push(MethodEntry {
            name,
            kind: MethodKind::Pending,
            body: Box::new(body),
        });
        self
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }

    pub(crate) fn entry(&self, index: usize) -> &MethodEntry<S> {
        &self.entries[index]
    }

    /// Registered method names, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }
}

impl<S> Default for MethodTable<S> {
    fn default() -> Self {
        Self::new()
    }
}
