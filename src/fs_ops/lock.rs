//! Advisory write locks.
//! Uses a hidden sidecar lock file so the lock survives the atomic rename that
//! replaces the locked file's inode.
//!
//! Design:
//! - File lock: `.<name>.ecfmt-lock` next to the file.
//! - Directory lock: `.ecfmt.dir.lock` inside the directory (guards the attribute sidecar).
//! - `fs2` takes the OS lock (flock on Unix, LockFileEx on Windows).
//! - The guard removes the lock file name, then unlocks. An acquirer that wins a lock on
//!   an already-unlinked file notices the mismatch and retries.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::trace;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

pub(crate) const DIR_LOCK_NAME: &str = ".ecfmt.dir.lock";
pub(crate) const FILE_LOCK_SUFFIX: &str = ".ecfmt-lock";

/// RAII guard held while a lock is active.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    pub fn lock_path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlink first so late waiters on this inode detect it and retry.
        let _ = fs::remove_file(&self.path);
        let _ = FileExt::unlock(&self.file);
        trace!(path = %self.path.display(), "lock released");
    }
}

fn dir_lock_path(dir: &Path) -> PathBuf {
    dir.join(DIR_LOCK_NAME)
}

pub(crate) fn file_lock_path(file: &Path) -> PathBuf {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let dir = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    dir.join(format!(".{name}{FILE_LOCK_SUFFIX}"))
}

fn open_lock_file(path: &Path) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.read(true).write(true).create(true).truncate(false);
    #[cfg(unix)]
    opts.mode(0o600).custom_flags(libc::O_CLOEXEC);
    opts.open(path)
}

/// True while `path` still names the inode behind `file`.
#[cfg(unix)]
fn still_linked(file: &File, path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;
    let held = file.metadata()?;
    match fs::metadata(path) {
        Ok(named) => Ok(named.dev() == held.dev() && named.ino() == held.ino()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

// Windows refuses to delete a file that is open, so the name cannot go stale.
#[cfg(not(unix))]
fn still_linked(_file: &File, _path: &Path) -> io::Result<bool> {
    Ok(true)
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error().is_some() && e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

fn acquire(lock_path: PathBuf, blocking: bool) -> io::Result<Option<FileLock>> {
    let start = Instant::now();
    loop {
        let file = open_lock_file(&lock_path)?;
        if blocking {
            file.lock_exclusive()?;
        } else if let Err(e) = file.try_lock_exclusive() {
            if is_contended(&e) {
                trace!(path = %lock_path.display(), "try-lock would block");
                return Ok(None);
            }
            return Err(e);
        }

        if still_linked(&file, &lock_path)? {
            let waited = start.elapsed();
            if waited.is_zero() {
                trace!(path = %lock_path.display(), "lock acquired immediately");
            } else {
                trace!(path = %lock_path.display(), waited_ms = waited.as_millis() as u64, "lock acquired after wait");
            }
            return Ok(Some(FileLock { file, path: lock_path }));
        }
        trace!(path = %lock_path.display(), "lock file replaced while waiting; retrying");
    }
}

/// Blocking acquire of the write lock for `file`.
pub fn acquire_file_lock(file: &Path) -> io::Result<FileLock> {
    acquire(file_lock_path(file), true)?
        .ok_or_else(|| io::Error::other("blocking lock returned without a guard"))
}

/// Non-blocking attempt. `Ok(None)` if another writer holds the lock.
pub fn try_acquire_file_lock(file: &Path) -> io::Result<Option<FileLock>> {
    acquire(file_lock_path(file), false)
}

/// Blocking acquire of the lock for `dir` itself.
pub fn acquire_dir_lock(dir: &Path) -> io::Result<FileLock> {
    acquire(dir_lock_path(dir), true)?
        .ok_or_else(|| io::Error::other("blocking lock returned without a guard"))
}

pub fn try_acquire_dir_lock(dir: &Path) -> io::Result<Option<FileLock>> {
    acquire(dir_lock_path(dir), false)
}
