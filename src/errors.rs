//! Typed error definitions for ecfmt.
//! Provides the failure taxonomy of a formatting task for better logs and tests.
//!
//! Propagation:
//! - Read/decode failures abort a task before any write is attempted.
//! - Write failures are surfaced, and the file's original content stays intact.
//! - Attribute failures are only reported as events; see `AttributeError`.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bytes are not valid under the chosen encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {encoding} byte sequence at offset {offset}")]
pub struct DecodeError {
    pub encoding: &'static str,
    /// Byte offset of the first malformed sequence.
    pub offset: u64,
}

/// Text cannot be represented in the target encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("character {ch:?} at offset {offset} cannot be encoded as {encoding}")]
    Unmappable {
        encoding: &'static str,
        ch: char,
        offset: usize,
    },

    #[error("{encoding} is a decode-only encoding")]
    Unsupported { encoding: &'static str },
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to lock {} for writing: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("refusing to write {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: EncodeError,
    },

    #[error("failed to replace contents of {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Persisting the encoding attribute failed after the content write committed.
/// Never fatal: reported to the event sink and recorded on `Written`.
#[derive(Debug, Error)]
#[error("failed to set attribute \"{key}\" to \"{value}\" for {}: {source}", .path.display())]
pub struct AttributeError {
    pub path: PathBuf,
    pub key: String,
    pub value: String,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Error)]
pub enum FormattingError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("formatting of {} was cancelled", .0.display())]
    Cancelled(PathBuf),
}

impl ReadError {
    pub fn path(&self) -> &Path {
        match self {
            ReadError::Io { path, .. } | ReadError::Decode { path, .. } => path,
        }
    }
}

impl WriteError {
    pub fn path(&self) -> &Path {
        match self {
            WriteError::Lock { path, .. }
            | WriteError::Encode { path, .. }
            | WriteError::Io { path, .. } => path,
        }
    }
}

impl FormattingError {
    /// Stable numeric code for structured logs and exit statuses.
    pub fn code(&self) -> u16 {
        match self {
            FormattingError::Read(ReadError::Io { .. }) => 10,
            FormattingError::Read(ReadError::Decode { .. }) => 11,
            FormattingError::Write(WriteError::Lock { .. }) => 20,
            FormattingError::Write(WriteError::Encode { .. }) => 21,
            FormattingError::Write(WriteError::Io { .. }) => 22,
            FormattingError::Cancelled(_) => 130,
        }
    }

    /// Short machine-friendly kind used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FormattingError::Read(ReadError::Io { .. }) => "read_io",
            FormattingError::Read(ReadError::Decode { .. }) => "decode",
            FormattingError::Write(WriteError::Lock { .. }) => "lock",
            FormattingError::Write(WriteError::Encode { .. }) => "encode",
            FormattingError::Write(WriteError::Io { .. }) => "write_io",
            FormattingError::Cancelled(_) => "cancelled",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FormattingError::Read(e) => e.path(),
            FormattingError::Write(e) => e.path(),
            FormattingError::Cancelled(path) => path,
        }
    }
}
