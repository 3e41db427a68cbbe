//! Many files at once: expand command-line paths into files, then run one
//! formatting task per file on a rayon pool.

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::cancel::Cancellation;
use crate::encoding::EncodingResolver;
use crate::errors::FormattingError;
use crate::events::EventSink;
use crate::fs_ops::{AttributeStore, LocalFile, is_internal_artifact};
use crate::rules::RuleSet;
use crate::task::FormattingTask;

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Worker threads; `None` lets rayon pick.
    pub jobs: Option<usize>,
    pub dry_run: bool,
    pub store: AttributeStore,
}

#[derive(Debug, Default)]
pub struct Summary {
    pub changed: Vec<PathBuf>,
    /// Would change (dry run).
    pub pending: Vec<PathBuf>,
    pub unchanged: usize,
    /// Binary files left alone.
    pub skipped: usize,
    pub cancelled: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.changed.len() + self.pending.len() + self.unchanged + self.skipped + self.cancelled + self.failed.len()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|s| s.starts_with('.') && s != "." && s != "..")
}

/// Expand `roots` into a sorted, de-duplicated list of regular files.
/// Files named directly are always kept; directory walks skip hidden entries unless
/// `include_hidden`, and never yield lock files, temp files or attribute sidecars.
pub fn collect_files(roots: &[PathBuf], include_hidden: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in roots {
        let meta = std::fs::metadata(root).with_context(|| format!("cannot access '{}'", root.display()))?;
        if meta.is_file() {
            files.push(root.clone());
            continue;
        }
        if !meta.is_dir() {
            bail!("'{}' is neither a file nor a directory", root.display());
        }
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || include_hidden || !is_hidden(e));
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && !is_internal_artifact(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    debug!(count = files.len(), "collected files");
    Ok(files)
}

/// Run a task per file. Per-file failures land in the summary; only pool setup errors
/// are returned.
pub fn run_batch(
    files: &[PathBuf],
    rules: &RuleSet,
    resolver: &EncodingResolver,
    sink: &dyn EventSink,
    cancel: &Cancellation,
    opts: &BatchOptions,
) -> Result<Summary> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = opts.jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder.build().context("failed to start worker pool")?;

    let task = FormattingTask::new(rules, resolver, sink)
        .with_cancellation(cancel)
        .dry_run(opts.dry_run);

    let results: Vec<(&Path, Result<_, FormattingError>)> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let file = LocalFile::with_store(path, opts.store);
                (path.as_path(), task.run_with(&file, |lines| crate::rules::canonicalize(lines, rules)))
            })
            .collect()
    });

    let mut summary = Summary::default();
    for (path, result) in results {
        match result {
            Ok(outcome) if outcome.changed => summary.changed.push(path.to_path_buf()),
            Ok(outcome) if outcome.pending => summary.pending.push(path.to_path_buf()),
            Ok(outcome) if outcome.skipped => summary.skipped += 1,
            Ok(_) => summary.unchanged += 1,
            Err(FormattingError::Cancelled(_)) => summary.cancelled += 1,
            Err(e) => {
                debug!(path = %path.display(), code = e.code(), kind = e.kind(), "task failed");
                summary.failed.push((path.to_path_buf(), e.to_string()));
            }
        }
    }
    Ok(summary)
}
