//! Filesystem operations: the file capability used by formatting tasks and its adapters.
//!
//! The core only sees `FileHandle`. `LocalFile` adapts a real path, `MemoryFile`
//! adapts an in-memory buffer (unsaved editor buffers, tests).

mod atomic;
mod attributes;
mod helpers;
mod local;
mod lock;
mod memory;
mod metadata;
mod util;

pub use atomic::{replace_file_contents, write_new_private};
pub use attributes::{AttributeStore, SIDECAR_FILE_NAME};
pub use helpers::io_error_with_help_io;
pub use local::LocalFile;
pub use lock::{FileLock, acquire_dir_lock, acquire_file_lock, try_acquire_dir_lock, try_acquire_file_lock};
pub use memory::MemoryFile;
pub use util::is_internal_artifact;

use std::fmt;
use std::io::{self, Read};
use std::path::Path;

/// Attribute key under which the last encoding used for a write is persisted.
pub const ENCODING_ATTRIBUTE: &str = "ENCODING";

/// Minimal capability interface over one file in the host's tree.
pub trait FileHandle: Send + Sync {
    fn path(&self) -> &Path;

    /// Fresh read stream positioned at the start of the file.
    fn open_read(&self) -> io::Result<Box<dyn Read + '_>>;

    /// Exclusive lock against other writers of this file. Released when the guard drops.
    fn lock_exclusive(&self) -> io::Result<WriteLock<'_>>;

    /// Replace the whole content. Requires the caller to hold the write lock.
    /// Implementations must leave the previous content intact when this fails.
    fn replace_contents(&self, lock: &WriteLock<'_>, bytes: &[u8]) -> io::Result<()>;

    fn attribute(&self, key: &str) -> io::Result<Option<String>>;

    fn set_attribute(&self, key: &str, value: &str) -> io::Result<()>;
}

trait Held {}
impl<T> Held for T {}

/// Scoped exclusive write lock returned by [`FileHandle::lock_exclusive`].
pub struct WriteLock<'a> {
    _held: Box<dyn Held + 'a>,
}

impl<'a> WriteLock<'a> {
    /// Wrap any guard whose `Drop` releases the underlying lock.
    pub fn new<G: 'a>(guard: G) -> Self {
        Self { _held: Box::new(guard) }
    }
}

impl fmt::Debug for WriteLock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WriteLock")
    }
}
