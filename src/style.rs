//! Report styling: ANSI colors, result glyphs, and indentation.
//!
//! Styling codes are embedded directly in report lines and are part of the
//! golden report format. [`strip`] removes them again for code-free text
//! comparisons.

const RESET: &str = "\x1b[0m";

fn wrap(code: &str, text: &str) -> String {
    format!("\x1b[{}m{}{}", code, text, RESET)
}

/// Colorize `text` green.
pub fn green(text: &str) -> String {
    wrap("32", text)
}

/// Colorize `text` red.
pub fn red(text: &str) -> String {
    wrap("31", text)
}

/// Colorize `text` yellow.
pub fn yellow(text: &str) -> String {
    wrap("33", text)
}

/// Colorize `text` blue.
pub fn blue(text: &str) -> String {
    wrap("34", text)
}

/// Success glyph: a green check mark.
pub fn green_check() -> String {
    green("✓")
}

/// Failure glyph: a red cross.
pub fn red_cross() -> String {
    red("✗")
}

/// Pending glyph: a yellow clock.
pub fn yellow_clock() -> String {
    yellow("⌚")
}

/// Insertion marker for line diffs.
pub fn green_plus() -> String {
    green("+")
}

/// Removal marker for line diffs.
pub fn red_minus() -> String {
    red("-")
}

/// Indent every line by one level (one leading space).
pub fn indent<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| format!(" {}", line.as_ref()))
        .collect()
}

/// Remove ANSI escape sequences from `text`.
pub fn strip(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // skip to the terminating `m` of the CSI sequence
            for e in &mut chars {
                if e == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}
