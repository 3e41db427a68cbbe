//! Config validation: catch settings that would only fail later, mid-run.

use anyhow::{Result, bail};

use super::paths::path_has_symlink_ancestor;
use super::types::Config;

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.jobs == Some(0) {
            bail!("jobs must be at least 1");
        }
        if !self.attribute_store.is_available() {
            bail!(
                "attribute store '{}' is not available in this build (enable the `xattrs` feature)",
                self.attribute_store
            );
        }
        if let Some(log) = &self.log_file {
            if log.is_dir() {
                bail!("log_file '{}' is a directory", log.display());
            }
            if path_has_symlink_ancestor(log)? {
                bail!("refusing log_file '{}': an ancestor is a symlink", log.display());
            }
        }
        Ok(())
    }
}
