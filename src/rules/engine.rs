//! Rule engine: lines plus rules to canonical text. Pure and deterministic.
//!
//! Order, applied to every run:
//! 1. trim trailing ASCII blanks (space, tab, vertical tab, form feed), per line;
//! 2. re-express leading indentation as tabs or spaces, keeping the visual column;
//! 3. adjust the end of the file per `final_newline`;
//! 4. join with the configured line ending, one separator between consecutive lines.
//!
//! Each step is idempotent and none undoes another, so canonicalizing the
//! re-split output yields the same text.

use std::fmt;

use super::{FinalNewline, IndentStyle, RuleSet};
use crate::reader::split_lines;

/// Text produced by [`canonicalize`] and not yet written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalText(String);

impl CanonicalText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Lines as the reader would produce them from this text.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        split_lines(&self.0)
    }
}

impl fmt::Display for CanonicalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CanonicalText {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CanonicalText {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Trimmed from line ends. Non-ASCII spaces such as U+00A0 are content.
const TRAILING_BLANKS: [char; 4] = [' ', '\t', '\u{0B}', '\u{0C}'];

pub fn canonicalize<I, S>(lines: I, rules: &RuleSet) -> CanonicalText
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = lines
        .into_iter()
        .map(|line| {
            let line = line.as_ref();
            let line = if rules.trim_trailing_whitespace {
                line.trim_end_matches(TRAILING_BLANKS)
            } else {
                line
            };
            match rules.indent_style {
                Some(style) => reindent(line, style, rules.tab_width),
                None => line.to_string(),
            }
        })
        .collect();

    match rules.final_newline {
        FinalNewline::Unset => {}
        FinalNewline::Insert => {
            // A lone "" is the empty file; it stays empty.
            if out.last().is_some_and(|l| !l.is_empty()) {
                out.push(String::new());
            }
        }
        FinalNewline::Remove => {
            while out.len() > 1 && out.last().is_some_and(String::is_empty) {
                out.pop();
            }
        }
    }

    CanonicalText(out.join(rules.line_ending.as_str()))
}

fn reindent(line: &str, style: IndentStyle, tab_width: usize) -> String {
    let tab_width = tab_width.max(1);
    let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
    let (indent, body) = line.split_at(indent_len);
    if indent.is_empty() {
        return line.to_string();
    }

    let mut col = 0usize;
    for c in indent.chars() {
        col = if c == '\t' { (col / tab_width + 1) * tab_width } else { col + 1 };
    }

    let mut out = String::with_capacity(col + body.len());
    match style {
        IndentStyle::Space => out.extend(std::iter::repeat_n(' ', col)),
        IndentStyle::Tab => {
            out.extend(std::iter::repeat_n('\t', col / tab_width));
            out.extend(std::iter::repeat_n(' ', col % tab_width));
        }
    }
    out.push_str(body);
    out
}
