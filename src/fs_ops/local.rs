//! `FileHandle` over a path on the local filesystem.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use super::atomic::replace_file_contents;
use super::attributes::AttributeStore;
use super::helpers::io_error_with_help_io;
use super::lock::acquire_file_lock;
use super::{FileHandle, WriteLock};

#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    store: AttributeStore,
}

impl LocalFile {
    /// Uses the sidecar attribute store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_store(path, AttributeStore::default())
    }

    pub fn with_store(path: impl Into<PathBuf>, store: AttributeStore) -> Self {
        Self {
            path: path.into(),
            store,
        }
    }

    pub fn store(&self) -> AttributeStore {
        self.store
    }
}

impl FileHandle for LocalFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn open_read(&self) -> io::Result<Box<dyn Read + '_>> {
        let file = File::open(&self.path).map_err(io_error_with_help_io("open file", &self.path))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn lock_exclusive(&self) -> io::Result<WriteLock<'_>> {
        let guard = acquire_file_lock(&self.path).map_err(io_error_with_help_io("lock file", &self.path))?;
        Ok(WriteLock::new(guard))
    }

    fn replace_contents(&self, _lock: &WriteLock<'_>, bytes: &[u8]) -> io::Result<()> {
        replace_file_contents(&self.path, bytes)
    }

    fn attribute(&self, key: &str) -> io::Result<Option<String>> {
        self.store.get(&self.path, key)
    }

    fn set_attribute(&self, key: &str, value: &str) -> io::Result<()> {
        self.store.set(&self.path, key, value)
    }
}
