//! Carry file attributes across an atomic replace.
//! The staged temp file starts with default mode and no xattrs; these copy the
//! original's onto it before the rename. Both are best-effort.

use std::fs;
use std::path::Path;
use tracing::{trace, warn};

/// Mode bits on Unix, the readonly flag elsewhere.
pub(super) fn copy_permissions(dest: &Path, src_meta: &fs::Metadata) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = src_meta.permissions().mode() & 0o7777;
        match fs::set_permissions(dest, fs::Permissions::from_mode(mode)) {
            Ok(()) => trace!(path = %dest.display(), mode = format!("{mode:o}"), "copied permissions"),
            Err(e) => warn!(path = %dest.display(), error = %e, "failed to copy permissions"),
        }
    }
    #[cfg(not(unix))]
    {
        let mut perms = match fs::metadata(dest) {
            Ok(m) => m.permissions(),
            Err(e) => {
                warn!(path = %dest.display(), error = %e, "failed to stat staged file");
                return;
            }
        };
        perms.set_readonly(src_meta.permissions().readonly());
        if let Err(e) = fs::set_permissions(dest, perms) {
            warn!(path = %dest.display(), error = %e, "failed to copy readonly flag");
        }
    }
}

/// Copy every extended attribute from `src` to `dest`. No-op without the `xattrs` feature.
pub(super) fn copy_xattrs(src: &Path, dest: &Path) {
    #[cfg(feature = "xattrs")]
    {
        let names = match xattr::list(src) {
            Ok(names) => names,
            Err(e) => {
                warn!(src = %src.display(), error = %e, "failed to list xattrs");
                return;
            }
        };
        for name in names {
            let value = match xattr::get(src, &name) {
                Ok(v) => v.unwrap_or_default(),
                Err(e) => {
                    warn!(src = %src.display(), xattr = %name.to_string_lossy(), error = %e, "failed to read xattr");
                    continue;
                }
            };
            match xattr::set(dest, &name, &value) {
                Ok(()) => trace!(dest = %dest.display(), xattr = %name.to_string_lossy(), size = value.len(), "copied xattr"),
                Err(e) => warn!(dest = %dest.display(), xattr = %name.to_string_lossy(), error = %e, "failed to set xattr"),
            }
        }
    }
    #[cfg(not(feature = "xattrs"))]
    {
        let _ = (src, dest);
    }
}
