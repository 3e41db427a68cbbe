//! Formatting rules applied to one file.
//! A `RuleSet` arrives already resolved; nothing here reads `.editorconfig` files.

mod engine;

pub use engine::{CanonicalText, canonicalize};

use std::fmt;
use std::str::FromStr;

use crate::encoding::Encoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lf" => Some(LineEnding::Lf),
            "crlf" => Some(LineEnding::CrLf),
            "cr" => Some(LineEnding::Cr),
            _ => None,
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineEnding::Lf => "lf",
            LineEnding::CrLf => "crlf",
            LineEnding::Cr => "cr",
        })
    }
}

impl FromStr for LineEnding {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid end of line: '{s}' (expected lf, crlf or cr)"))
    }
}

/// What to do with the end of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinalNewline {
    /// Leave the line count alone.
    #[default]
    Unset,
    /// Make a non-empty text end with a line ending.
    Insert,
    /// Drop every trailing line ending.
    Remove,
}

impl FromStr for FinalNewline {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unset" => Ok(FinalNewline::Unset),
            "insert" | "true" => Ok(FinalNewline::Insert),
            "remove" | "false" => Ok(FinalNewline::Remove),
            _ => Err(format!("invalid final newline: '{s}' (expected insert, remove or unset)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Tab,
    Space,
}

impl FromStr for IndentStyle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tab" => Ok(IndentStyle::Tab),
            "space" => Ok(IndentStyle::Space),
            _ => Err(format!("invalid indent style: '{s}' (expected tab or space)")),
        }
    }
}

/// Resolved rules for one file. Fields other than `line_ending` and
/// `trim_trailing_whitespace` default to leaving the content as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    pub line_ending: LineEnding,
    pub trim_trailing_whitespace: bool,
    pub final_newline: FinalNewline,
    pub indent_style: Option<IndentStyle>,
    /// Visual width of a tab when converting indentation.
    pub tab_width: usize,
    /// Target encoding. `None` keeps the resolved one.
    pub charset: Option<Encoding>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            line_ending: LineEnding::Lf,
            trim_trailing_whitespace: false,
            final_newline: FinalNewline::Unset,
            indent_style: None,
            tab_width: 4,
            charset: None,
        }
    }
}

impl RuleSet {
    pub fn new(line_ending: LineEnding, trim_trailing_whitespace: bool) -> Self {
        Self {
            line_ending,
            trim_trailing_whitespace,
            ..Self::default()
        }
    }

    pub fn with_final_newline(mut self, final_newline: FinalNewline) -> Self {
        self.final_newline = final_newline;
        self
    }

    pub fn with_indent_style(mut self, style: IndentStyle) -> Self {
        self.indent_style = Some(style);
        self
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    pub fn with_charset(mut self, charset: Encoding) -> Self {
        self.charset = Some(charset);
        self
    }
}
