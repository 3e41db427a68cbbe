//! Core configuration types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::fs_ops::AttributeStore;

/// Console verbosity exposed to users and the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only
    Quiet,
    /// Warnings plus one line per rewritten file
    #[default]
    Normal,
    /// Also unchanged files and encoding decisions
    Info,
    /// Everything, including lock and temp-file traces
    Debug,
}

impl LogLevel {
    /// Case-insensitive, with a few aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" | "warn" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        })
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime settings of the host. XML values first, CLI flags on top.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub log_level: LogLevel,
    /// Optional log file in addition to the console
    pub log_file: Option<PathBuf>,
    /// Where the `ENCODING` attribute is persisted
    pub attribute_store: AttributeStore,
    /// Worker threads; `None` = one per CPU
    pub jobs: Option<usize>,
    /// Descend into hidden files and directories
    pub include_hidden: bool,
    /// Report what would change without writing
    pub dry_run: bool,
}
