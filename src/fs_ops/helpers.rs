//! Attach the failing operation, the path and an actionable hint to `io::Error`s.
//!
//!   File::open(p).map_err(io_error_with_help_io("open file", p))?;

use std::io;
use std::path::Path;

#[cfg(unix)]
fn hint_for_os(code: i32) -> Option<&'static str> {
    let hint = match code {
        libc::EACCES | libc::EPERM => "permission denied; check ownership and write permissions",
        libc::EXDEV => "temporary file landed on another filesystem; atomic replace not possible",
        libc::EBUSY | libc::ETXTBSY => "resource busy; another process is using the file",
        libc::ENOENT => "path not found; verify it exists",
        libc::ENOSPC => "no space left on device",
        libc::EROFS => "read-only filesystem",
        libc::ELOOP => "too many levels of symbolic links",
        libc::ENAMETOOLONG => "file name too long",
        libc::EMFILE | libc::ENFILE => "too many open files; lower --jobs or raise the limit",
        libc::ENOTSUP => "operation not supported by this filesystem",
        _ => return None,
    };
    Some(hint)
}

#[cfg(windows)]
fn hint_for_os(code: i32) -> Option<&'static str> {
    let hint = match code {
        5 => "access denied; check permissions",
        2 | 3 => "path not found; verify it exists",
        32 | 33 => "file is in use by another process",
        112 => "insufficient disk space",
        19 => "media is write protected",
        206 => "file name or path too long",
        _ => return None,
    };
    Some(hint)
}

#[cfg(not(any(unix, windows)))]
fn hint_for_os(_code: i32) -> Option<&'static str> {
    None
}

fn hint_for_kind(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions"),
        io::ErrorKind::NotFound => Some("path not found; verify it exists"),
        io::ErrorKind::Unsupported => Some("operation not supported here"),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Some("busy; retry after the current write finishes"),
        _ => None,
    }
}

fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{op} '{}': {e}", path.display());
    let hint = match e.raw_os_error() {
        Some(code) => hint_for_os(code),
        None => hint_for_kind(e.kind()),
    };
    if let Some(hint) = hint {
        msg.push_str(" (");
        msg.push_str(hint);
        msg.push(')');
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}

/// Keeps the original `ErrorKind`.
pub fn io_error_with_help_io<'a>(op: &'a str, path: &'a Path) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| io::Error::new(e.kind(), build_message(op, path, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_kind_and_names_operation() {
        let e = io::Error::new(io::ErrorKind::NotFound, "gone");
        let wrapped = io_error_with_help_io("open file", Path::new("a.txt"))(e);
        assert_eq!(wrapped.kind(), io::ErrorKind::NotFound);
        let msg = wrapped.to_string();
        assert!(msg.starts_with("open file 'a.txt': gone"));
        assert!(msg.contains("verify it exists"));
    }
}
