//! Whole-file replacement that never leaves a half-written file behind.
//!
//! Steps: stage bytes in a hidden sibling temp file, fsync it, copy the original's
//! permissions (and xattrs with the `xattrs` feature), rename over the original,
//! then fsync the directory. Any failure before the rename removes the temp file
//! and leaves the original untouched.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use super::helpers::io_error_with_help_io;
use super::metadata::{copy_permissions, copy_xattrs};
use super::util::{fsync_dir, unique_temp_path};

/// Removes the staged file unless the rename consumed it.
struct StagedFile {
    path: PathBuf,
    armed: bool,
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Atomically replace the content of `path` with `bytes`.
/// A symlink is followed so the link itself survives and its target is rewritten.
pub fn replace_file_contents(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let target = match fs::symlink_metadata(path) {
        Ok(m) if m.file_type().is_symlink() => fs::canonicalize(path).map_err(io_error_with_help_io("resolve symlink", path))?,
        _ => path.to_path_buf(),
    };
    let original = match fs::metadata(&target) {
        Ok(m) => Some(m),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(io_error_with_help_io("stat file", &target)(e)),
    };
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut staged = StagedFile {
        path: unique_temp_path(&dir),
        armed: true,
    };
    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    opts.mode(0o600);
    let mut file = opts
        .open(&staged.path)
        .map_err(io_error_with_help_io("create temp file", &staged.path))?;
    file.write_all(bytes)
        .and_then(|()| file.flush())
        .and_then(|()| file.sync_all())
        .map_err(io_error_with_help_io("write temp file", &staged.path))?;
    drop(file);

    if let Some(meta) = &original {
        copy_permissions(&staged.path, meta);
        copy_xattrs(&target, &staged.path);
    }

    fs::rename(&staged.path, &target).map_err(io_error_with_help_io("replace file", &target))?;
    staged.armed = false;

    if let Err(e) = fsync_dir(&dir) {
        // The rename already happened; durability of the directory entry is best-effort.
        trace!(dir = %dir.display(), error = %e, "directory fsync failed");
    }
    debug!(path = %target.display(), bytes = bytes.len(), "file replaced");
    Ok(())
}

/// Create a new file readable only by the owner. Fails if `path` exists.
pub fn write_new_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    opts.mode(0o600);
    let mut file = opts.open(path).map_err(io_error_with_help_io("create file", path))?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(io_error_with_help_io("write file", path))
}
