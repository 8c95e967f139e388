//! Capability registry: type-directed dispatch for matcher behavior.
//!
//! Each matcher carries one [`Capabilities`] table per capability kind
//! (Predicate, Nesting, Chain). A table is an ordered list of
//! `(guard, implementation)` pairs; lookup walks the guards
//! most-specific-first and returns the first implementation whose guard
//! admits the subject. Built-in matchers keep their guards mutually
//! exclusive by construction, so overlapping registrations never decide
//! an outcome.

use std::any::TypeId;

use crate::errors::CapabilityError;
use crate::subject::Subject;

/// Decides whether a capability implementation applies to a subject.
#[derive(Clone)]
pub enum Guard {
    /// Admits exactly one runtime type.
    Exact(TypeId),
    /// Admits subjects passing a protocol test (e.g. "has elements").
    Satisfies {
        /// A short label for debugging.
        name: &'static str,
        /// The protocol test.
        test: fn(&dyn Subject) -> bool,
    },
    /// Admits every subject; at most one universal fallback per table.
    Universal,
}

impl Guard {
    /// An exact guard for type `T`.
    pub fn exact<T: 'static>() -> Guard {
        Guard::Exact(TypeId::of::<T>())
    }

    /// A protocol guard.
    pub fn satisfies(name: &'static str, test: fn(&dyn Subject) -> bool) -> Guard {
        Guard::Satisfies { name, test }
    }

    fn admits(&self, subject: &dyn Subject) -> bool {
        match self {
            Guard::Exact(id) => subject.as_any().type_id() == *id,
            Guard::Satisfies { test, .. } => test(subject),
            Guard::Universal => true,
        }
    }

    // Lookup walks rank 0 (exact), then 1 (protocol), then 2 (universal),
    // each in registration order.
    fn rank(&self) -> u8 {
        match self {
            Guard::Exact(_) => 0,
            Guard::Satisfies { .. } => 1,
            Guard::Universal => 2,
        }
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Guard::Exact(id) => write!(f, "Exact({:?})", id),
            Guard::Satisfies { name, .. } => write!(f, "Satisfies({})", name),
            Guard::Universal => write!(f, "Universal"),
        }
    }
}

/// An ordered capability table.
#[derive(Clone)]
pub struct Capabilities<T> {
    kind: &'static str,
    entries: Vec<(Guard, T)>,
}

impl<T> Capabilities<T> {
    /// An empty table for the named capability kind.
    pub fn new(kind: &'static str) -> Capabilities<T> {
        Capabilities {
            kind,
            entries: Vec::new(),
        }
    }

    /// The capability kind this table dispatches.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register an implementation behind a guard.
    pub fn register(&mut self, guard: Guard, implementation: T) {
        self.entries.push((guard, implementation));
    }

    /// Find the most specific implementation admitting `subject`.
    pub fn lookup(&self, subject: &dyn Subject) -> Option<&T> {
        for rank in 0..=2 {
            if let Some((_, imp)) = self
                .entries
                .iter()
                .filter(|(guard, _)| guard.rank() == rank)
                .find(|(guard, _)| guard.admits(subject))
            {
                return Some(imp);
            }
        }
        None
    }

    /// Like [`lookup`](Self::lookup), but failure is the structured
    /// [`CapabilityError::NoCapability`].
    pub fn lookup_or(
        &self,
        subject: &dyn Subject,
        matcher: &str,
    ) -> Result<&T, CapabilityError> {
        self.lookup(subject)
            .ok_or_else(|| CapabilityError::NoCapability {
                capability: self.kind,
                matcher: matcher.to_string(),
                subject_type: subject.type_label().to_string(),
            })
    }

    /// Tag lookup for chain tables: keyed by the matcher's declared type
    /// tag, not the subject. Matches `Exact` and `Universal` guards only.
    pub fn lookup_tag(&self, tag: Option<TypeId>) -> Option<&T> {
        self.entries
            .iter()
            .find(|(guard, _)| matches!(guard, Guard::Exact(id) if Some(*id) == tag))
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(guard, _)| matches!(guard, Guard::Universal))
            })
            .map(|(_, imp)| imp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_elements(subject: &dyn Subject) -> bool {
        subject.elements().is_some()
    }

    fn table() -> Capabilities<&'static str> {
        let mut caps = Capabilities::new("Predicate");
        caps.register(Guard::satisfies("has elements", has_elements), "elements");
        caps.register(Guard::exact::<String>(), "string");
        caps.register(Guard::Universal, "fallback");
        caps
    }

    #[test]
    fn test_exact_beats_protocol_regardless_of_registration_order() {
        // String has elements too, but the exact guard wins.
        let caps = table();
        assert_eq!(caps.lookup(&String::from("abc")), Some(&"string"));
    }

    #[test]
    fn test_protocol_beats_universal() {
        let caps = table();
        assert_eq!(caps.lookup(&vec![1i64, 2]), Some(&"elements"));
        assert_eq!(caps.lookup(&3i64), Some(&"fallback"));
    }

    #[test]
    fn test_lookup_failure_is_structured() {
        let mut caps: Capabilities<&'static str> = Capabilities::new("Nesting");
        caps.register(Guard::exact::<String>(), "string");
        let err = caps.lookup_or(&3i64, "contain").unwrap_err();
        assert_eq!(
            err,
            CapabilityError::NoCapability {
                capability: "Nesting",
                matcher: "contain".to_string(),
                subject_type: "i64".to_string(),
            }
        );
    }

    #[test]
    fn test_tag_lookup_matches_exact_and_universal_only() {
        let mut caps: Capabilities<&'static str> = Capabilities::new("Chain");
        caps.register(Guard::satisfies("has elements", has_elements), "protocol");
        caps.register(Guard::exact::<String>(), "string");
        assert_eq!(
            caps.lookup_tag(Some(TypeId::of::<String>())),
            Some(&"string")
        );
        assert_eq!(caps.lookup_tag(Some(TypeId::of::<i64>())), None);
        assert_eq!(caps.lookup_tag(None), None);

        caps.register(Guard::Universal, "universal");
        assert_eq!(caps.lookup_tag(None), Some(&"universal"));
        assert_eq!(
            caps.lookup_tag(Some(TypeId::of::<i64>())),
            Some(&"universal")
        );
    }
}
