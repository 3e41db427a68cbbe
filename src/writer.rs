//! Atomic file writer.
//!
//! Under the file's exclusive lock: encode the whole text, replace the content,
//! then stamp the `ENCODING` attribute. The lock guard is scoped to `write`, so it
//! is released on every return path.

use tracing::{debug, trace};

use crate::encoding::Encoding;
use crate::errors::{AttributeError, WriteError};
use crate::events::{EventSink, TaskEvent};
use crate::fs_ops::{ENCODING_ATTRIBUTE, FileHandle};
use crate::rules::CanonicalText;

/// Result of a committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    pub bytes: usize,
    pub encoding: Encoding,
    /// False when the content landed but the `ENCODING` attribute could not be stored.
    pub attribute_persisted: bool,
}

pub fn write(
    file: &dyn FileHandle,
    text: &CanonicalText,
    encoding: Encoding,
    sink: &dyn EventSink,
) -> Result<Written, WriteError> {
    let path = file.path();
    let lock = file.lock_exclusive().map_err(|source| WriteError::Lock {
        path: path.to_path_buf(),
        source,
    })?;
    trace!(path = %path.display(), "write lock held");

    let bytes = encoding.encode(text.as_str()).map_err(|source| WriteError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    file.replace_contents(&lock, &bytes).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), encoding = encoding.name(), bytes = bytes.len(), "content replaced");

    let attribute_persisted = stamp_encoding(file, encoding, sink);
    drop(lock);

    Ok(Written {
        bytes: bytes.len(),
        encoding,
        attribute_persisted,
    })
}

fn stamp_encoding(file: &dyn FileHandle, encoding: Encoding, sink: &dyn EventSink) -> bool {
    let path = file.path();
    let value = encoding.name();
    match file.set_attribute(ENCODING_ATTRIBUTE, value) {
        Ok(()) => {
            sink.emit(&TaskEvent::AttributeSet {
                path: path.to_path_buf(),
                key: ENCODING_ATTRIBUTE.to_string(),
                value: value.to_string(),
            });
            true
        }
        Err(source) => {
            let err = AttributeError {
                path: path.to_path_buf(),
                key: ENCODING_ATTRIBUTE.to_string(),
                value: value.to_string(),
                source,
            };
            sink.emit(&TaskEvent::AttributeFailed {
                path: err.path.clone(),
                key: err.key.clone(),
                value: err.value.clone(),
                error: err.source.to_string(),
            });
            false
        }
    }
}
