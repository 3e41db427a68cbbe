//! In-memory `FileHandle`: an unsaved editor buffer, or a test double.
//!
//! Failures can be injected for reads, the next write and attribute access, and
//! every write attempt is recorded together with whether the write lock was held.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{FileHandle, WriteLock};

#[derive(Debug, Default)]
struct State {
    content: Vec<u8>,
    attributes: HashMap<String, String>,
    writes: usize,
    write_attempts: usize,
    unlocked_writes: usize,
    fail_next_write: Option<io::ErrorKind>,
    fail_reads: Option<io::ErrorKind>,
    fail_attribute_reads: bool,
    fail_attribute_writes: bool,
    read_chunk: Option<usize>,
}

#[derive(Debug, Default)]
pub struct MemoryFile {
    path: PathBuf,
    state: Mutex<State>,
    lock: Mutex<()>,
}

impl MemoryFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(State {
                content: content.into(),
                ..State::default()
            }),
            lock: Mutex::new(()),
        }
    }

    /// Seed an attribute without going through the failure switches.
    pub fn with_attribute(self, key: &str, value: &str) -> Self {
        self.state().attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Serve reads at most `n` bytes at a time.
    pub fn with_read_chunk(self, n: usize) -> Self {
        self.state().read_chunk = Some(n.max(1));
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn content(&self) -> Vec<u8> {
        self.state().content.clone()
    }

    /// Content as UTF-8, lossily. Convenience for assertions.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.state().content).into_owned()
    }

    pub fn attributes(&self) -> HashMap<String, String> {
        self.state().attributes.clone()
    }

    /// Successful content replacements.
    pub fn writes(&self) -> usize {
        self.state().writes
    }

    /// Replacement attempts, including failed ones.
    pub fn write_attempts(&self) -> usize {
        self.state().write_attempts
    }

    /// Attempts made while the write lock was not actually held.
    pub fn unlocked_writes(&self) -> usize {
        self.state().unlocked_writes
    }

    pub fn is_locked(&self) -> bool {
        self.lock.try_lock().is_err()
    }

    pub fn fail_next_write(&self, kind: io::ErrorKind) {
        self.state().fail_next_write = Some(kind);
    }

    pub fn fail_reads(&self, kind: io::ErrorKind) {
        self.state().fail_reads = Some(kind);
    }

    pub fn fail_attribute_reads(&self) {
        self.state().fail_attribute_reads = true;
    }

    pub fn fail_attribute_writes(&self) {
        self.state().fail_attribute_writes = true;
    }
}

impl FileHandle for MemoryFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn open_read(&self) -> io::Result<Box<dyn Read + '_>> {
        let state = self.state();
        if let Some(kind) = state.fail_reads {
            return Err(io::Error::new(kind, "injected read failure"));
        }
        let cursor = Cursor::new(state.content.clone());
        Ok(match state.read_chunk {
            Some(n) => Box::new(Chunked { inner: cursor, n }),
            None => Box::new(cursor),
        })
    }

    fn lock_exclusive(&self) -> io::Result<WriteLock<'_>> {
        let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(WriteLock::new(guard))
    }

    fn replace_contents(&self, _lock: &WriteLock<'_>, bytes: &[u8]) -> io::Result<()> {
        let locked = self.is_locked();
        let mut state = self.state();
        state.write_attempts += 1;
        if !locked {
            state.unlocked_writes += 1;
        }
        if let Some(kind) = state.fail_next_write.take() {
            return Err(io::Error::new(kind, "injected write failure"));
        }
        state.content = bytes.to_vec();
        state.writes += 1;
        Ok(())
    }

    fn attribute(&self, key: &str) -> io::Result<Option<String>> {
        let state = self.state();
        if state.fail_attribute_reads {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "injected attribute read failure"));
        }
        Ok(state.attributes.get(key).cloned())
    }

    fn set_attribute(&self, key: &str, value: &str) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_attribute_writes {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "injected attribute write failure"));
        }
        state.attributes.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

struct Chunked<R> {
    inner: R,
    n: usize,
}

impl<R: Read> Read for Chunked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.n);
        self.inner.read(&mut buf[..len])
    }
}
