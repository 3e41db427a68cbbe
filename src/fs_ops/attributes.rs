//! Per-file string attributes that persist across runs.
//!
//! Two backends:
//! - `Sidecar` (default, portable): one `.ecfmt-attributes.json` per directory,
//!   `{"files": {"<file name>": {"<key>": "<value>"}}}`. Updates are read-modify-write
//!   under the directory lock and land through an atomic replace.
//! - `Xattr`: extended attribute `user.<key>` on the file itself. Needs the `xattrs`
//!   feature and a filesystem that supports user xattrs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::trace;

use super::atomic::replace_file_contents;
use super::helpers::io_error_with_help_io;
use super::lock::acquire_dir_lock;

pub const SIDECAR_FILE_NAME: &str = ".ecfmt-attributes.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeStore {
    #[default]
    Sidecar,
    Xattr,
}

impl AttributeStore {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sidecar" | "json" => Some(AttributeStore::Sidecar),
            "xattr" | "xattrs" => Some(AttributeStore::Xattr),
            _ => None,
        }
    }

    /// Whether this build can use the backend at all.
    pub fn is_available(&self) -> bool {
        match self {
            AttributeStore::Sidecar => true,
            AttributeStore::Xattr => cfg!(feature = "xattrs"),
        }
    }

    pub fn get(&self, path: &Path, key: &str) -> io::Result<Option<String>> {
        match self {
            AttributeStore::Sidecar => sidecar_get(path, key),
            AttributeStore::Xattr => xattr_get(path, key),
        }
    }

    pub fn set(&self, path: &Path, key: &str, value: &str) -> io::Result<()> {
        match self {
            AttributeStore::Sidecar => sidecar_set(path, key, value),
            AttributeStore::Xattr => xattr_set(path, key, value),
        }
    }
}

impl fmt::Display for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttributeStore::Sidecar => "sidecar",
            AttributeStore::Xattr => "xattr",
        })
    }
}

impl FromStr for AttributeStore {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid attribute store: '{s}' (expected sidecar or xattr)"))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SidecarDoc {
    #[serde(default)]
    files: BTreeMap<String, BTreeMap<String, String>>,
}

fn split_path(path: &Path) -> io::Result<(PathBuf, String)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("no usable file name in '{}'", path.display())))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, name.to_string()))
}

fn load_sidecar(sidecar: &Path) -> io::Result<SidecarDoc> {
    let raw = match fs::read(sidecar) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SidecarDoc::default()),
        Err(e) => return Err(io_error_with_help_io("read attribute sidecar", sidecar)(e)),
    };
    serde_json::from_slice(&raw).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("malformed attribute sidecar '{}': {e}", sidecar.display()),
        )
    })
}

fn sidecar_get(path: &Path, key: &str) -> io::Result<Option<String>> {
    let (dir, name) = split_path(path)?;
    let mut doc = load_sidecar(&dir.join(SIDECAR_FILE_NAME))?;
    Ok(doc.files.get_mut(&name).and_then(|attrs| attrs.remove(key)))
}

fn sidecar_set(path: &Path, key: &str, value: &str) -> io::Result<()> {
    let (dir, name) = split_path(path)?;
    let sidecar = dir.join(SIDECAR_FILE_NAME);
    let _guard = acquire_dir_lock(&dir).map_err(io_error_with_help_io("lock directory", &dir))?;

    let mut doc = load_sidecar(&sidecar)?;
    let attrs = doc.files.entry(name).or_default();
    if attrs.get(key).map(String::as_str) == Some(value) {
        return Ok(());
    }
    attrs.insert(key.to_string(), value.to_string());

    let mut bytes = serde_json::to_vec_pretty(&doc).map_err(io::Error::other)?;
    bytes.push(b'\n');
    replace_file_contents(&sidecar, &bytes)?;
    trace!(sidecar = %sidecar.display(), key, value, "attribute stored");
    Ok(())
}

#[cfg(feature = "xattrs")]
fn xattr_name(key: &str) -> String {
    format!("user.{key}")
}

#[cfg(feature = "xattrs")]
fn xattr_get(path: &Path, key: &str) -> io::Result<Option<String>> {
    match xattr::get(path, xattr_name(key))? {
        None => Ok(None),
        Some(raw) => String::from_utf8(raw).map(Some).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, format!("xattr {} is not UTF-8", xattr_name(key)))
        }),
    }
}

#[cfg(feature = "xattrs")]
fn xattr_set(path: &Path, key: &str, value: &str) -> io::Result<()> {
    xattr::set(path, xattr_name(key), value.as_bytes())
}

#[cfg(not(feature = "xattrs"))]
fn xattr_get(_path: &Path, _key: &str) -> io::Result<Option<String>> {
    Err(xattrs_disabled())
}

#[cfg(not(feature = "xattrs"))]
fn xattr_set(_path: &Path, _key: &str, _value: &str) -> io::Result<()> {
    Err(xattrs_disabled())
}

#[cfg(not(feature = "xattrs"))]
fn xattrs_disabled() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "built without the `xattrs` feature")
}
