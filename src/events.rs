//! Task events and the injected observability sink.
//!
//! Every decision a formatting task makes is reported as a `TaskEvent`. Hosts plug
//! in an `EventSink`; `TracingSink` forwards to `tracing`, `RecordingSink` keeps
//! events in memory so callers (and tests) can assert on them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{Level, debug, error, info, trace, warn};

use crate::encoding::EncodingSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Started {
        path: PathBuf,
    },
    AttributeUnreadable {
        path: PathBuf,
        key: String,
        error: String,
    },
    UnknownEncodingLabel {
        path: PathBuf,
        label: String,
    },
    EncodingResolved {
        path: PathBuf,
        encoding: &'static str,
        source: EncodingSource,
    },
    Unchanged {
        path: PathBuf,
    },
    /// Binary content: left exactly as it is.
    SkippedBinary {
        path: PathBuf,
    },
    ChangeDetected {
        path: PathBuf,
        text_changed: bool,
        transcode_to: Option<&'static str>,
    },
    WouldWrite {
        path: PathBuf,
    },
    Written {
        path: PathBuf,
        encoding: &'static str,
        bytes: usize,
    },
    AttributeSet {
        path: PathBuf,
        key: String,
        value: String,
    },
    AttributeFailed {
        path: PathBuf,
        key: String,
        value: String,
        error: String,
    },
    Failed {
        path: PathBuf,
        code: u16,
        error: String,
    },
    Cancelled {
        path: PathBuf,
    },
}

impl TaskEvent {
    pub fn path(&self) -> &Path {
        match self {
            TaskEvent::Started { path }
            | TaskEvent::AttributeUnreadable { path, .. }
            | TaskEvent::UnknownEncodingLabel { path, .. }
            | TaskEvent::EncodingResolved { path, .. }
            | TaskEvent::Unchanged { path }
            | TaskEvent::SkippedBinary { path }
            | TaskEvent::ChangeDetected { path, .. }
            | TaskEvent::WouldWrite { path }
            | TaskEvent::Written { path, .. }
            | TaskEvent::AttributeSet { path, .. }
            | TaskEvent::AttributeFailed { path, .. }
            | TaskEvent::Failed { path, .. }
            | TaskEvent::Cancelled { path } => path,
        }
    }

    /// Severity used when the event is forwarded to `tracing`.
    pub fn level(&self) -> Level {
        match self {
            TaskEvent::Started { .. } | TaskEvent::EncodingResolved { .. } => Level::DEBUG,
            TaskEvent::Unchanged { .. } | TaskEvent::AttributeSet { .. } => Level::DEBUG,
            TaskEvent::ChangeDetected { .. } => Level::DEBUG,
            TaskEvent::WouldWrite { .. } | TaskEvent::Written { .. } => Level::INFO,
            TaskEvent::Cancelled { .. } | TaskEvent::SkippedBinary { .. } => Level::INFO,
            TaskEvent::AttributeUnreadable { .. } | TaskEvent::UnknownEncodingLabel { .. } => Level::WARN,
            TaskEvent::AttributeFailed { .. } | TaskEvent::Failed { .. } => Level::ERROR,
        }
    }
}

impl fmt::Display for TaskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskEvent::Started { path } => write!(f, "{}: formatting started", path.display()),
            TaskEvent::AttributeUnreadable { path, key, error } => {
                write!(f, "{}: cannot read attribute \"{key}\": {error}", path.display())
            }
            TaskEvent::UnknownEncodingLabel { path, label } => {
                write!(f, "{}: ignoring unknown encoding \"{label}\"", path.display())
            }
            TaskEvent::EncodingResolved { path, encoding, source } => {
                write!(f, "{}: using encoding {encoding} ({source})", path.display())
            }
            TaskEvent::Unchanged { path } => write!(f, "{}: already canonical", path.display()),
            TaskEvent::SkippedBinary { path } => write!(f, "{}: skipped (binary content)", path.display()),
            TaskEvent::ChangeDetected { path, text_changed, transcode_to } => {
                write!(f, "{}: needs rewrite", path.display())?;
                if *text_changed {
                    f.write_str(" (content)")?;
                }
                if let Some(enc) = transcode_to {
                    write!(f, " (encoding -> {enc})")?;
                }
                Ok(())
            }
            TaskEvent::WouldWrite { path } => write!(f, "{}: would be rewritten (dry run)", path.display()),
            TaskEvent::Written { path, encoding, bytes } => {
                write!(f, "{}: rewritten as {encoding} ({bytes} bytes)", path.display())
            }
            TaskEvent::AttributeSet { path, key, value } => {
                write!(f, "{}: attribute \"{key}\" set to \"{value}\"", path.display())
            }
            TaskEvent::AttributeFailed { path, key, value, error } => write!(
                f,
                "{}: failed to set attribute \"{key}\" to \"{value}\": {error}",
                path.display()
            ),
            TaskEvent::Failed { path, code, error } => {
                write!(f, "{}: failed [{code}]: {error}", path.display())
            }
            TaskEvent::Cancelled { path } => write!(f, "{}: cancelled", path.display()),
        }
    }
}

/// Receiver of task events. Implementations must tolerate calls from many worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &TaskEvent);
}

impl<F> EventSink for F
where
    F: Fn(&TaskEvent) + Send + Sync,
{
    fn emit(&self, event: &TaskEvent) {
        self(event)
    }
}

/// Forwards events to the `tracing` subscriber installed by the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &TaskEvent) {
        let path = event.path().display();
        let level = event.level();
        if level == Level::ERROR {
            error!(path = %path, "{event}");
        } else if level == Level::WARN {
            warn!(path = %path, "{event}");
        } else if level == Level::INFO {
            info!(path = %path, "{event}");
        } else if level == Level::DEBUG {
            debug!(path = %path, "{event}");
        } else {
            trace!(path = %path, "{event}");
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TaskEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TaskEvent> {
        self.events.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Rendered lines, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &TaskEvent) {
        if let Ok(mut g) = self.events.lock() {
            g.push(event.clone());
        }
    }
}

/// Sends every event to two sinks (e.g. tracing plus an in-memory recorder).
#[derive(Debug)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: EventSink, B: EventSink> EventSink for Tee<A, B> {
    fn emit(&self, event: &TaskEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}
