//! Core library for `ecfmt`.
//!
//! Applies an already-resolved set of formatting rules (encoding, line endings,
//! trailing whitespace, final newline, indentation) to one file at a time and
//! rewrites the file only when its canonical form differs from what is on disk.
//!
//! Per file: resolve encoding -> read lines -> canonicalize -> compare -> write.
//! Hosts supply the file through [`FileHandle`] and observe progress through an
//! [`EventSink`].

pub mod batch;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod detect;
pub mod encoding;
pub mod errors;
pub mod events;
pub mod fs_ops;
pub mod output;
pub mod platform;
pub mod reader;
pub mod rules;
pub mod task;
pub mod writer;

pub use cancel::Cancellation;
pub use config::{Config, LogLevel, default_config_path, default_log_path, path_has_symlink_ancestor};
pub use detect::has_changed;
pub use encoding::{ContentSniffer, Encoding, EncodingGuess, EncodingResolver, EncodingSource, Guess, ResolvedEncoding};
pub use errors::{AttributeError, DecodeError, EncodeError, FormattingError, ReadError, WriteError};
pub use events::{EventSink, RecordingSink, TaskEvent, TracingSink};
pub use fs_ops::{AttributeStore, ENCODING_ATTRIBUTE, FileHandle, LocalFile, MemoryFile, WriteLock};
pub use reader::{LineReader, read_lines, read_lines_with_text, read_whole, split_lines};
pub use rules::{CanonicalText, FinalNewline, IndentStyle, LineEnding, RuleSet, canonicalize};
pub use task::{FormattingTask, Outcome, run_formatting_task};
pub use writer::{Written, write};
