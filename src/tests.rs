//! End-to-end tests: whole spec types through the runner to rendered
//! reports.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::expectable::{expect, verify};
use crate::matchers::{contain, equal, greater_equal};
use crate::runner::{run_location, Runner, SpecLocation};
use crate::spec::{MethodTable, Spec, Verdict};
use crate::style::strip;
use crate::SpecError;

fn stripped_report(report: &crate::runner::SpecReport) -> Vec<String> {
    report.report_lines().iter().map(|l| strip(l)).collect()
}

#[derive(Default)]
struct Simple;

impl Spec for Simple {
    fn doc() -> &'static str {
        "A simple spec.\n\
         it compares numbers $compare\n\
         it finds a missing element $missing"
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new()
            .method("compare", |_| {
                expect(3i64).must(greater_equal(3i64)).step()
            })
            .method("missing", |_| {
                expect(vec![1i64, 2, 3]).must(contain(7i64)).step()
            })
    }
}

#[test]
fn test_simple_spec_report() {
    let report = run_location::<Simple>(&SpecLocation::of::<Simple>()).unwrap();
    assert_eq!(report.name, "Simple");
    assert_eq!(report.stats.total, 2);
    assert_eq!(report.stats.successes, 1);
    assert_eq!(report.stats.failures, 1);
    insta::assert_snapshot!(stripped_report(&report).join("\n"), @r###"
    A simple spec.
     ✓ it compares numbers
     ✗ it finds a missing element
      `[1, 2, 3]` does not contain `7`
    "###);
    // Unstripped lines carry the glyph color codes.
    let raw = report.report_lines().join("\n");
    assert!(raw.contains("\x1b[32m✓\x1b[0m"));
    assert!(raw.contains("\x1b[31m✗\x1b[0m"));
}

#[test]
fn test_full_run_render_with_footer() {
    let mut runner = Runner::new();
    runner.run::<Simple>();
    let mut report = runner.finish();
    report.elapsed = Duration::ZERO;
    insta::assert_snapshot!(strip(&report.render()), @r###"
    A simple spec.
     ✓ it compares numbers
     ✗ it finds a missing element
      `[1, 2, 3]` does not contain `7`

    2 specs in 0ms:  ✓ 1  ✗ 1
    "###);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_method_filter_keeps_prose() {
    let location = SpecLocation::of::<Simple>().with_method("compare");
    let report = run_location::<Simple>(&location).unwrap();
    assert_eq!(report.stats.total, 1);
    assert_eq!(report.stats.failures, 0);
    assert_eq!(
        stripped_report(&report),
        vec!["A simple spec.", " ✓ it compares numbers"]
    );
}

#[derive(Default)]
struct Both;

impl Spec for Both {
    fn doc() -> &'static str {
        "checks two things at once $both"
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new().method("both", |_| {
            expect(1i64)
                .must(equal(1i64))
                .and(expect(2i64).must(equal(3i64)))
                .step()
        })
    }
}

#[test]
fn test_combined_expectation_reports_both_sides() {
    let report = run_location::<Both>(&SpecLocation::of::<Both>()).unwrap();
    assert_eq!(
        stripped_report(&report),
        vec![" ✗ checks two things at once", "  1 == 1", "  2 /= 3"]
    );
}

static LATER_CALLS: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct Someday;

impl Spec for Someday {
    fn doc() -> &'static str {
        "will be specified later $later"
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new().pending("later", |_| {
            LATER_CALLS.fetch_add(1, Ordering::SeqCst);
            expect(1i64).must(equal(2i64)).step()
        })
    }
}

#[test]
fn test_pending_renders_head_only_and_never_runs() {
    let report = run_location::<Someday>(&SpecLocation::of::<Someday>()).unwrap();
    assert_eq!(
        stripped_report(&report),
        vec![" ⌚ will be specified later"]
    );
    assert_eq!(report.stats.pending, 1);
    assert_eq!(report.stats.failures, 1);
    assert_eq!(report.stats.successes, 0);
    assert_eq!(LATER_CALLS.load(Ordering::SeqCst), 0);
}

static AFTER_SIGNAL: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct Inline;

impl Spec for Inline {
    const UNSAFE: bool = true;

    fn doc() -> &'static str {
        "inline assertions pass $passes\n\
         inline assertions fail $fails"
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new()
            .method("passes", |_| {
                verify(5i64, greater_equal(2i64))?;
                Ok(Verdict::Inline)
            })
            .method("fails", |_| {
                verify(vec![1i64, 0], contain(greater_equal(2i64)))?;
                AFTER_SIGNAL.fetch_add(1, Ordering::SeqCst);
                Ok(Verdict::Inline)
            })
    }
}

#[test]
fn test_unsafe_spec_signals_at_the_call_site() {
    let report = run_location::<Inline>(&SpecLocation::of::<Inline>()).unwrap();
    assert_eq!(report.stats.successes, 1);
    assert_eq!(report.stats.failures, 1);
    // The failing assertion aborts the method before later statements.
    assert_eq!(AFTER_SIGNAL.load(Ordering::SeqCst), 0);
    insta::assert_snapshot!(stripped_report(&report).join("\n"), @r###"
     ✓ inline assertions pass
     ✗ inline assertions fail
      unsafe spec failed:
       no elements match:
        1 < 2
        0 < 2
    "###);
}

#[derive(Default)]
struct Explosive;

impl Spec for Explosive {
    fn doc() -> &'static str {
        "recovers from a panic $blows_up"
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new().method("blows_up", |_| panic!("too many puppies"))
    }
}

#[test]
fn test_panicking_method_becomes_a_fatal_line() {
    let report = run_location::<Explosive>(&SpecLocation::of::<Explosive>()).unwrap();
    let lines = stripped_report(&report);
    assert_eq!(lines[0], " ✗ recovers from a panic");
    assert_eq!(lines[1], "  fatal error:");
    assert!(lines[2].starts_with("   at "));
    assert!(lines[2].ends_with("in blows_up"));
    assert!(lines[2].contains("tests.rs"));
    assert_eq!(lines[3], "   panicked: too many puppies");
    assert_eq!(report.stats.failures, 1);
}

#[derive(Default)]
struct Census;

impl Spec for Census {
    const ALL_SPECS: bool = true;

    fn methods() -> MethodTable<Self> {
        MethodTable::new()
            .method("first", |_| expect(1i64).must(equal(1i64)).step())
            .method("second", |_| expect(true).must(equal(true)).step())
    }
}

#[test]
fn test_all_specs_synthesizes_lines_from_the_table() {
    let report = run_location::<Census>(&SpecLocation::of::<Census>()).unwrap();
    assert_eq!(stripped_report(&report), vec![" ✓ first", " ✓ second"]);
    assert_eq!(report.stats.total, 2);
}

#[derive(Default)]
struct Wordless;

impl Spec for Wordless {
    fn methods() -> MethodTable<Self> {
        MethodTable::new().method("unreachable", |_| expect(1i64).must(equal(1i64)).step())
    }
}

#[test]
fn test_empty_doc_without_all_specs_is_an_error() {
    let error = run_location::<Wordless>(&SpecLocation::of::<Wordless>()).unwrap_err();
    assert_eq!(error.to_string(), "spec `Wordless` has no doc text");

    let location = SpecLocation {
        allow_empty_doc: true,
        ..SpecLocation::of::<Wordless>()
    };
    let report = run_location::<Wordless>(&location).unwrap();
    assert!(report.lines.is_empty());
}

#[derive(Default)]
struct Typo;

impl Spec for Typo {
    fn doc() -> &'static str {
        "points at nothing $nope"
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new().method("yep", |_| expect(1i64).must(equal(1i64)).step())
    }
}

#[test]
fn test_unknown_marker_is_an_error() {
    let error = run_location::<Typo>(&SpecLocation::of::<Typo>()).unwrap_err();
    assert_eq!(
        error.to_string(),
        "spec class `Typo` does not define a spec `nope`"
    );
}

static SNEAKY_TEARDOWNS: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct Sneaky;

impl Spec for Sneaky {
    fn doc() -> &'static str {
        "returns nothing $quiet"
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new().method("quiet", |_| Ok(Verdict::Inline))
    }

    fn teardown(&mut self) {
        SNEAKY_TEARDOWNS.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_inline_verdict_outside_unsafe_is_an_error() {
    let error = run_location::<Sneaky>(&SpecLocation::of::<Sneaky>()).unwrap_err();
    assert_eq!(
        error.to_string(),
        "spec `Sneaky` method `quiet` did not return an expectation"
    );
    // Setup ran for the method, so teardown must still run even though
    // the run fails.
    assert_eq!(SNEAKY_TEARDOWNS.load(Ordering::SeqCst), 1);
}

struct Unbuildable;

impl Default for Unbuildable {
    fn default() -> Self {
        panic!("bad constructor")
    }
}

impl Spec for Unbuildable {
    fn doc() -> &'static str {
        "never reached $nothing"
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new().method("nothing", |_| expect(1i64).must(equal(1i64)).step())
    }
}

#[test]
fn test_panicking_constructor_is_a_run_level_error() {
    let error = run_location::<Unbuildable>(&SpecLocation::of::<Unbuildable>()).unwrap_err();
    assert_eq!(
        error.to_string(),
        "failed to construct spec `Unbuildable`: bad constructor"
    );
}

static SETUPS: AtomicUsize = AtomicUsize::new(0);
static TEARDOWNS: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct Hooked;

impl Spec for Hooked {
    fn doc() -> &'static str {
        "first hooked method $one\n\
         second hooked method, panicking $two"
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new()
            .method("one", |_| expect(1i64).must(equal(1i64)).step())
            .method("two", |_| panic!("mid-method"))
    }

    fn setup(&mut self) {
        SETUPS.fetch_add(1, Ordering::SeqCst);
    }

    fn teardown(&mut self) {
        TEARDOWNS.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_hooks_run_around_each_method_even_on_panic() {
    let report = run_location::<Hooked>(&SpecLocation::of::<Hooked>()).unwrap();
    assert_eq!(report.stats.total, 2);
    assert_eq!(SETUPS.load(Ordering::SeqCst), 2);
    assert_eq!(TEARDOWNS.load(Ordering::SeqCst), 2);
}

#[derive(Default)]
struct Misused;

impl Spec for Misused {
    fn doc() -> &'static str {
        "applies containment to a number $oops"
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new().method("oops", |_| expect(3i64).must(contain(1i64)).step())
    }
}

#[test]
fn test_capability_mismatch_fails_the_whole_location() {
    let error = run_location::<Misused>(&SpecLocation::of::<Misused>()).unwrap_err();
    assert!(matches!(error, SpecError::Capability(_)));
    assert_eq!(
        error.to_string(),
        "no `Predicate` capability of matcher `contain` matches subject type `i64`"
    );
}

#[test]
fn test_runner_collects_run_level_errors_and_keeps_going() {
    let mut runner = Runner::new();
    runner.run::<Wordless>().run::<Census>();
    let report = runner.finish();
    assert_eq!(report.specs.len(), 1);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(report.errors[0], SpecError::MissingDoc { .. }));
    assert!(!report.success());
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_all_green_run_exits_zero() {
    let mut runner = Runner::new();
    runner.run::<Census>();
    let report = runner.finish();
    assert!(report.success());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.stats().failures, 0);
}
