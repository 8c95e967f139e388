//! The spec runner: doc lines in, rendered reports out.
//!
//! Per spec line the state machine is `NotRun → Executing → {Succeeded,
//! Failed, FatalError, Pending}`. The runner instantiates the spec type,
//! runs lifecycle hooks around each selected method, recovers panics and
//! unsafe-assertion signals, times execution, and aggregates per-line
//! reports into per-spec and per-run reports.

use std::time::{Duration, Instant};

use crate::errors::{SpecError, SpecResult};
use crate::expectation::{Expectation, ExpectationResult, FatalInfo};
use crate::parser::{parse_doc, ParsedLine};
use crate::spec::{MethodKind, MethodTable, Spec, Verdict};
use crate::style;
use crate::trap;

/// Resolved reference to a spec type plus an optional method filter.
#[derive(Debug, Clone)]
pub struct SpecLocation {
    /// The spec type's display name.
    pub name: String,
    /// When set, only the matching spec lines run; prose lines always
    /// stay.
    pub method: Option<String>,
    /// How the location was found, for run-level error messages.
    pub selector: String,
    /// Permit an empty doc without the `ALL_SPECS` marker.
    pub allow_empty_doc: bool,
}

impl SpecLocation {
    /// The location of spec type `S`, unfiltered.
    pub fn of<S: Spec>() -> SpecLocation {
        SpecLocation {
            name: S::name().to_string(),
            method: None,
            selector: S::name().to_string(),
            allow_empty_doc: false,
        }
    }

    /// Restrict the run to one method.
    pub fn with_method(mut self, method: impl Into<String>) -> SpecLocation {
        self.method = Some(method.into());
        self
    }
}

/// One executed spec line.
#[derive(Debug, Clone)]
pub struct ResultLine {
    /// Trimmed description text.
    pub text: String,
    /// The forced expectation.
    pub result: ExpectationResult,
    /// Wall time of the method invocation plus evaluation.
    pub duration: Duration,
}

impl ResultLine {
    /// The outcome glyph for this line.
    pub fn sign(&self) -> String {
        if self.result.is_pending() {
            style::yellow_clock()
        } else if self.result.success() {
            style::green_check()
        } else {
            style::red_cross()
        }
    }

    /// Rendered lines: the signed head, then (on failure) the nested
    /// report one level deeper; the whole line indents one level under
    /// prose. Pending renders the head only.
    pub fn output_lines(&self) -> Vec<String> {
        let head = format!("{} {}", self.sign(), self.text);
        let mut block = vec![head];
        if self.result.failure() && !self.result.is_pending() {
            block.extend(style::indent(self.result.report_lines()));
        }
        style::indent(block)
    }
}

/// One line of a spec run.
#[derive(Debug, Clone)]
pub enum Line {
    /// Prose, passed through unchanged.
    Plain(String),
    /// A resolved but not yet executed spec marker.
    Spec { name: String, text: String },
    /// An executed spec line.
    Result(ResultLine),
}

impl Line {
    /// Rendered lines for the report.
    pub fn output_lines(&self) -> Vec<String> {
        match self {
            Line::Plain(text) => vec![text.clone()],
            Line::Spec { name, text } => vec![format!("{} ${}", text, name)],
            Line::Result(result) => result.output_lines(),
        }
    }
}

/// Counters aggregated over result lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Number of result lines.
    pub total: usize,
    /// Successful lines.
    pub successes: usize,
    /// Failing lines; pending lines count here too.
    pub failures: usize,
    /// Pending lines, also included in `failures`.
    pub pending: usize,
}

impl RunStats {
    fn record(&mut self, result: &ExpectationResult) {
        self.total += 1;
        if result.is_pending() {
            self.pending += 1;
            self.failures += 1;
        } else if result.success() {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
    }

    fn merge(&mut self, other: &RunStats) {
        self.total += other.total;
        self.successes += other.successes;
        self.failures += other.failures;
        self.pending += other.pending;
    }
}

/// The executed lines of one spec location.
#[derive(Debug, Clone)]
pub struct SpecReport {
    /// The spec type's display name.
    pub name: String,
    /// Executed lines in document order.
    pub lines: Vec<Line>,
    /// Per-spec counters.
    pub stats: RunStats,
}

impl SpecReport {
    /// Rendered report lines.
    pub fn report_lines(&self) -> Vec<String> {
        self.lines.iter().flat_map(Line::output_lines).collect()
    }
}

/// All spec reports of one runner invocation plus run-level errors.
#[derive(Debug)]
pub struct RunReport {
    /// Per-location reports.
    pub specs: Vec<SpecReport>,
    /// Run-level errors; each failed its whole location.
    pub errors: Vec<SpecError>,
    /// Wall time of the whole run.
    pub elapsed: Duration,
}

impl RunReport {
    /// Counters over all locations.
    pub fn stats(&self) -> RunStats {
        let mut stats = RunStats::default();
        for spec in &self.specs {
            stats.merge(&spec.stats);
        }
        stats
    }

    /// True when nothing failed, including run-level errors.
    pub fn success(&self) -> bool {
        self.stats().failures == 0 && self.errors.is_empty()
    }

    /// Exit code for the CLI boundary: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }

    /// The full rendered report: spec blocks joined by a blank line, then
    /// the footer.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for (i, spec) in self.specs.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.extend(spec.report_lines());
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format_footer(&self.stats(), self.elapsed));
        lines.join("\n")
    }

    /// Emit the report through the logging facade; run-level errors go to
    /// the error level. With `color` off, styling codes are stripped at
    /// print time only.
    pub fn print(&self, color: bool) {
        let text = if color {
            self.render()
        } else {
            style::strip(&self.render())
        };
        log::info!("{}", text);
        for error in &self.errors {
            log::error!("{}", error);
        }
    }
}

/// The run footer.
pub(crate) fn format_footer(stats: &RunStats, elapsed: Duration) -> String {
    format!(
        "{} specs in {}:  {} {}  {} {}",
        stats.total,
        format_duration(elapsed),
        style::green_check(),
        stats.successes,
        style::red_cross(),
        stats.failures,
    )
}

/// Bucketed human-readable duration.
pub fn format_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    let secs = elapsed.as_secs();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if secs < 10 {
        format!("{}.{:03}s", secs, elapsed.subsec_millis())
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3_600 {
        format!("{}min {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}min", secs / 3_600, (secs % 3_600) / 60)
    }
}

fn resolve_lines<S: Spec>(
    location: &SpecLocation,
    table: &MethodTable<S>,
) -> SpecResult<Vec<Line>> {
    let doc = S::doc();
    if doc.trim().is_empty() {
        if S::ALL_SPECS {
            // Synthesize one spec line per table entry, text = name.
            return Ok(table
                .names()
                .iter()
                .map(|name| Line::Spec {
                    name: (*name).to_string(),
                    text: (*name).to_string(),
                })
                .collect());
        }
        if location.allow_empty_doc {
            return Ok(Vec::new());
        }
        return Err(SpecError::MissingDoc {
            name: location.name.clone(),
        });
    }

    parse_doc(doc)
        .into_iter()
        .map(|line| match line {
            ParsedLine::Plain(text) => Ok(Line::Plain(text)),
            ParsedLine::Marker { text, method } => match table.position(&method) {
                Some(_) => Ok(Line::Spec { name: method, text }),
                None => Err(SpecError::UndefinedMethod {
                    class: location.name.clone(),
                    method,
                }),
            },
        })
        .collect()
}

// Keep all prose lines; keep only the spec lines matching the requested
// method, or all spec lines if no filter is given.
fn filter_lines(lines: Vec<Line>, location: &SpecLocation) -> Vec<Line> {
    match &location.method {
        None => lines,
        Some(filter) => lines
            .into_iter()
            .filter(|line| match line {
                Line::Spec { name, .. } => name == filter,
                _ => true,
            })
            .collect(),
    }
}

fn run_method<S: Spec>(
    instance: &mut S,
    table: &MethodTable<S>,
    location: &SpecLocation,
    name: &str,
    text: String,
) -> SpecResult<ResultLine> {
    let index = table
        .position(name)
        .ok_or_else(|| SpecError::UndefinedMethod {
            class: location.name.clone(),
            method: name.to_string(),
        })?;
    let entry = table.entry(index);
    instance.setup();
    let started = Instant::now();

    let expectation = match entry.kind {
        // The pending body is never invoked.
        MethodKind::Pending => Ok(Expectation::Pending),
        MethodKind::Normal => match trap::catch(|| entry.invoke(instance)) {
            Err(trapped) => {
                let (file, line) = trapped
                    .site
                    .unwrap_or_else(|| ("<unknown>".to_string(), 0));
                Ok(Expectation::Fatal(FatalInfo {
                    name: entry.name.to_string(),
                    message: trapped.message,
                    file,
                    line,
                }))
            }
            Ok(Err(failed)) => Ok(Expectation::FailedUnsafe {
                name: entry.name.to_string(),
                report: failed.report,
            }),
            Ok(Ok(Verdict::Inline)) => {
                if S::UNSAFE {
                    Ok(Expectation::Unsafe { lines: Vec::new() })
                } else {
                    Err(SpecError::NoExpectation {
                        class: S::name().to_string(),
                        method: entry.name.to_string(),
                    })
                }
            }
            Ok(Ok(Verdict::Expectation(expectation))) => Ok(expectation),
        },
    };

    // Teardown runs after evaluation, and before a run-level error
    // propagates, since setup already ran for this method.
    let result = expectation.and_then(|expectation| expectation.evaluate());
    instance.teardown();
    let result = result?;
    let duration = started.elapsed();
    Ok(ResultLine {
        text,
        result,
        duration,
    })
}

/// Run one spec location to a [`SpecReport`].
pub fn run_location<S: Spec>(location: &SpecLocation) -> SpecResult<SpecReport> {
    let table = S::methods();
    let resolved = filter_lines(resolve_lines::<S>(location, &table)?, location);

    let mut instance = trap::catch(S::default).map_err(|trapped| SpecError::Construct {
        name: location.name.clone(),
        message: trapped.message,
    })?;

    let mut lines = Vec::with_capacity(resolved.len());
    let mut stats = RunStats::default();
    for line in resolved {
        match line {
            Line::Spec { name, text } => {
                let result = run_method(&mut instance, &table, location, &name, text)?;
                stats.record(&result.result);
                lines.push(Line::Result(result));
            }
            other => lines.push(other),
        }
    }

    Ok(SpecReport {
        name: location.name.clone(),
        lines,
        stats,
    })
}

/// Sequential driver over spec locations.
///
/// Run-level errors are logged, collected, and fail the report without
/// stopping the remaining locations.
pub struct Runner {
    started: Instant,
    specs: Vec<SpecReport>,
    errors: Vec<SpecError>,
}

impl Runner {
    /// Start a run.
    pub fn new() -> Runner {
        Runner {
            started: Instant::now(),
            specs: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Run spec type `S`, unfiltered.
    pub fn run<S: Spec>(&mut self) -> &mut Runner {
        let location = SpecLocation::of::<S>();
        self.run_at::<S>(location)
    }

    /// Run spec type `S` at an explicit location.
    pub fn run_at<S: Spec>(&mut self, location: SpecLocation) -> &mut Runner {
        match run_location::<S>(&location) {
            Ok(report) => self.specs.push(report),
            Err(error) => {
                log::error!("spec run failed for `{}`: {}", location.selector, error);
                self.errors.push(error);
            }
        }
        self
    }

    /// Finish the run.
    pub fn finish(&mut self) -> RunReport {
        RunReport {
            specs: std::mem::take(&mut self.specs),
            errors: std::mem::take(&mut self.errors),
            elapsed: self.started.elapsed(),
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}
