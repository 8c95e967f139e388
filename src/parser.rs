//! Parser for the literate doc mini-language.
//!
//! Each doc line is prose or a spec marker `<description-text>$<method>`.
//! Parsing is pure string work; resolving method names against a spec's
//! method table happens separately in the runner.

/// One parsed doc line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Prose, trimmed.
    Plain(String),
    /// A spec marker: trimmed description text plus the method name.
    Marker { text: String, method: String },
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parse one doc line.
///
/// A marker is recognized iff the line contains a `$` with at least one
/// character before it and a word character immediately after it. The
/// method name is the longest word-character run after the first `$`;
/// trailing junk is ignored.
fn parse_line(line: &str) -> ParsedLine {
    if let Some(pos) = line.find('$') {
        let (text, rest) = line.split_at(pos);
        let method: String = rest[1..].chars().take_while(|&c| is_word(c)).collect();
        if !text.is_empty() && !method.is_empty() {
            return ParsedLine::Marker {
                text: text.trim().to_string(),
                method,
            };
        }
    }
    ParsedLine::Plain(line.trim().to_string())
}

/// Parse a doc text into one [`ParsedLine`] per line, in original order.
pub fn parse_doc(doc: &str) -> Vec<ParsedLine> {
    doc.lines().map(parse_line).collect()
}
