use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::attributes::SIDECAR_FILE_NAME;
use super::lock::{DIR_LOCK_NAME, FILE_LOCK_SUFFIX};

const TEMP_PREFIX: &str = ".ecfmt.";
const TEMP_SUFFIX: &str = ".tmp";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Hidden sibling name for a staged replacement. Unique per process, call and instant.
pub(super) fn unique_temp_path(dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    dir.join(format!("{TEMP_PREFIX}{pid}.{nanos}.{seq}{TEMP_SUFFIX}"))
}

/// fsync a directory so a completed rename survives a crash. Unix only; no-op elsewhere.
pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        File::open(dir)?.sync_all()
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
        Ok(())
    }
}

/// True for files this crate creates next to user files: lock files, staged
/// temporaries and the attribute sidecar. Tree walks skip them.
pub fn is_internal_artifact(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name == SIDECAR_FILE_NAME
        || name == DIR_LOCK_NAME
        || (name.starts_with('.') && name.ends_with(FILE_LOCK_SUFFIX))
        || (name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_paths_do_not_collide() {
        let a = unique_temp_path(Path::new("/tmp"));
        let b = unique_temp_path(Path::new("/tmp"));
        assert_ne!(a, b);
        assert!(is_internal_artifact(&a));
    }

    #[test]
    fn recognizes_artifacts() {
        assert!(is_internal_artifact(Path::new("d/.ecfmt-attributes.json")));
        assert!(is_internal_artifact(Path::new("d/.main.rs.ecfmt-lock")));
        assert!(is_internal_artifact(Path::new("d/.ecfmt.dir.lock")));
        assert!(!is_internal_artifact(Path::new("d/main.rs")));
        assert!(!is_internal_artifact(Path::new("d/.gitignore")));
    }
}
