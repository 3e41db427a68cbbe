//! Formatting task: resolve encoding, read, canonicalize, compare, and write only
//! when something changed.
//!
//! State flow per file:
//!   Start -> EncodingResolved -> Read -> Canonicalized -> Unchanged
//!                                                      -> WritePending -> Written | WriteFailed
//!   Start -> SkippedBinary (binary guess, or NUL characters in the decoded text)
//!
//! Cancellation is checked after resolving, after reading and before taking the
//! write lock. Once the lock is held the write runs to completion.

use std::path::Path;

use tracing::debug;

use crate::cancel::Cancellation;
use crate::detect::has_changed;
use crate::encoding::{Encoding, EncodingResolver};
use crate::errors::FormattingError;
use crate::events::{EventSink, TaskEvent};
use crate::fs_ops::FileHandle;
use crate::reader::read_lines_with_text;
use crate::rules::{CanonicalText, RuleSet, canonicalize};
use crate::writer;

/// What a task did to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// A write happened.
    pub changed: bool,
    /// A write was needed but skipped (dry run).
    pub pending: bool,
    /// Binary content; never canonicalized or written.
    pub skipped: bool,
    /// Encoding the file is now in (or would be, for a dry run). `None` when skipped.
    pub encoding: Option<Encoding>,
    /// Target encoding differed from the resolved one.
    pub transcoded: bool,
}

impl Outcome {
    fn untouched(encoding: Option<Encoding>) -> Self {
        Self {
            changed: false,
            pending: false,
            skipped: encoding.is_none(),
            encoding,
            transcoded: false,
        }
    }

    /// Changed on disk, or would have been.
    pub fn needs_write(&self) -> bool {
        self.changed || self.pending
    }
}

pub struct FormattingTask<'a> {
    rules: &'a RuleSet,
    resolver: &'a EncodingResolver,
    sink: &'a dyn EventSink,
    cancel: Option<&'a Cancellation>,
    dry_run: bool,
}

impl<'a> FormattingTask<'a> {
    pub fn new(rules: &'a RuleSet, resolver: &'a EncodingResolver, sink: &'a dyn EventSink) -> Self {
        Self {
            rules,
            resolver,
            sink,
            cancel: None,
            dry_run: false,
        }
    }

    pub fn with_cancellation(mut self, cancel: &'a Cancellation) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Decide everything but never write.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Canonicalize `file` with the task's rules. `Ok(true)` iff the file was rewritten.
    pub fn run(&self, file: &dyn FileHandle) -> Result<bool, FormattingError> {
        self.run_with(file, |lines| canonicalize(lines, self.rules))
            .map(|outcome| outcome.changed)
    }

    /// Like [`run`](Self::run) with a caller-supplied canonicalization.
    pub fn run_with<F>(&self, file: &dyn FileHandle, transform: F) -> Result<Outcome, FormattingError>
    where
        F: FnOnce(&[String]) -> CanonicalText,
    {
        let path = file.path();
        self.sink.emit(&TaskEvent::Started { path: path.to_path_buf() });

        let result = self.execute(file, transform);
        if let Err(e) = &result {
            match e {
                FormattingError::Cancelled(_) => {
                    self.sink.emit(&TaskEvent::Cancelled { path: path.to_path_buf() })
                }
                other => self.sink.emit(&TaskEvent::Failed {
                    path: path.to_path_buf(),
                    code: other.code(),
                    error: other.to_string(),
                }),
            }
        }
        result
    }

    fn execute<F>(&self, file: &dyn FileHandle, transform: F) -> Result<Outcome, FormattingError>
    where
        F: FnOnce(&[String]) -> CanonicalText,
    {
        let path = file.path();
        let Some(resolved) = self.resolver.resolve(file, self.sink) else {
            return Ok(self.skip_binary(path));
        };
        self.checkpoint(path)?;

        let (lines, original) = read_lines_with_text(file, resolved.encoding)?;
        self.checkpoint(path)?;
        if original.contains('\0') {
            return Ok(self.skip_binary(path));
        }

        let canonical = transform(&lines);
        let target = self.rules.charset.unwrap_or(resolved.encoding);
        let text_changed = has_changed(&original, &canonical);
        let transcoded = target != resolved.encoding;
        debug!(path = %path.display(), lines = lines.len(), text_changed, transcoded, "canonicalized");

        if !text_changed && !transcoded {
            self.sink.emit(&TaskEvent::Unchanged { path: path.to_path_buf() });
            return Ok(Outcome::untouched(Some(resolved.encoding)));
        }

        self.sink.emit(&TaskEvent::ChangeDetected {
            path: path.to_path_buf(),
            text_changed,
            transcode_to: transcoded.then(|| target.name()),
        });

        if self.dry_run {
            self.sink.emit(&TaskEvent::WouldWrite { path: path.to_path_buf() });
            return Ok(Outcome {
                changed: false,
                pending: true,
                skipped: false,
                encoding: Some(target),
                transcoded,
            });
        }

        self.checkpoint(path)?;
        let written = writer::write(file, &canonical, target, self.sink)?;
        self.sink.emit(&TaskEvent::Written {
            path: path.to_path_buf(),
            encoding: written.encoding.name(),
            bytes: written.bytes,
        });
        Ok(Outcome {
            changed: true,
            pending: false,
            skipped: false,
            encoding: Some(written.encoding),
            transcoded,
        })
    }

    fn skip_binary(&self, path: &Path) -> Outcome {
        self.sink.emit(&TaskEvent::SkippedBinary { path: path.to_path_buf() });
        Outcome::untouched(None)
    }

    fn checkpoint(&self, path: &Path) -> Result<(), FormattingError> {
        match self.cancel {
            Some(c) if c.is_cancelled() => Err(FormattingError::Cancelled(path.to_path_buf())),
            _ => Ok(()),
        }
    }
}

/// One-shot entry point with the default resolver (attribute, content sniffing, UTF-8).
pub fn run_formatting_task(
    file: &dyn FileHandle,
    rules: &RuleSet,
    sink: &dyn EventSink,
) -> Result<Outcome, FormattingError> {
    let resolver = EncodingResolver::new();
    FormattingTask::new(rules, &resolver, sink).run_with(file, |lines| canonicalize(lines, rules))
}
