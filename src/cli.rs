//! CLI definition and parsing.
//!
//! Notes:
//! - Rule flags describe one resolved rule set applied to every file given.
//! - Host flags override values from config.xml.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};
use crate::encoding::Encoding;
use crate::fs_ops::AttributeStore;
use crate::rules::{FinalNewline, IndentStyle, LineEnding, RuleSet};

/// Normalize encodings, line endings and whitespace of files in place.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Apply formatting rules to files safely")]
pub struct Args {
    /// Files or directories to format. Directories are walked recursively.
    #[arg(value_name = "PATH", required_unless_present = "print_config", value_hint = ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,

    /// Line ending to join lines with: lf, crlf or cr.
    #[arg(long = "end-of-line", value_name = "EOL", default_value = "lf")]
    pub end_of_line: LineEnding,

    /// Strip whitespace at the end of every line.
    #[arg(long)]
    pub trim_trailing_whitespace: bool,

    /// insert, remove or unset.
    #[arg(long, value_name = "MODE", default_value = "unset")]
    pub final_newline: FinalNewline,

    /// Re-express leading indentation as tab or space.
    #[arg(long, value_name = "STYLE")]
    pub indent_style: Option<IndentStyle>,

    /// Columns per tab when converting indentation.
    #[arg(long, value_name = "N", default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    pub tab_width: u16,

    /// Re-encode files into this charset (e.g. utf-8, utf-16le, latin1).
    #[arg(long, value_name = "ENCODING")]
    pub charset: Option<Encoding>,

    /// Do not write; exit with status 1 if any file would change.
    #[arg(long)]
    pub check: bool,

    /// Report what would change without writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Worker threads (default: one per CPU).
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Walk into hidden files and directories.
    #[arg(long)]
    pub include_hidden: bool,

    /// Where to remember each file's encoding: sidecar or xattr.
    #[arg(long, value_name = "STORE")]
    pub attribute_store: Option<AttributeStore>,

    /// Enable debug logging (shorthand for --log-level debug).
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// quiet, normal, info or debug.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Also write logs to this file.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Print the config file location and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Rule set described by the rule flags.
    pub fn rule_set(&self) -> RuleSet {
        RuleSet {
            line_ending: self.end_of_line,
            trim_trailing_whitespace: self.trim_trailing_whitespace,
            final_newline: self.final_newline,
            indent_style: self.indent_style,
            tab_width: usize::from(self.tab_width),
            charset: self.charset,
        }
    }

    /// Precedence: --debug, then --log-level, then None (keep config value).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a loaded Config in place. Unset flags leave it alone.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(path) = &self.log_file {
            cfg.log_file = Some(path.clone());
        }
        if let Some(store) = self.attribute_store {
            cfg.attribute_store = store;
        }
        if self.jobs.is_some() {
            cfg.jobs = self.jobs;
        }
        if self.include_hidden {
            cfg.include_hidden = true;
        }
        if self.dry_run || self.check {
            cfg.dry_run = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
