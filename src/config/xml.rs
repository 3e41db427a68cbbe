//! XML configuration.
//! - Reads config.xml with quick_xml + serde; unknown elements are an error.
//! - On first run at the default location, writes a commented 0600 template.
//!
//! Only ambient host settings live here. Formatting rules come from the command line.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::paths::{CONFIG_ENV, default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use crate::fs_ops::{AttributeStore, write_new_private};
use crate::platform::set_dir_mode_0700;

#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    attribute_store: Option<String>,
    jobs: Option<String>,
    include_hidden: Option<String>,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bool(field: &str, s: &str) -> Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => bail!("{field}: expected true or false, got '{s}'"),
    }
}

fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();
    if let Some(s) = non_empty(parsed.log_level.as_deref()) {
        cfg.log_level = s.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    if let Some(s) = non_empty(parsed.log_file.as_deref()) {
        cfg.log_file = Some(PathBuf::from(s));
    }
    if let Some(s) = non_empty(parsed.attribute_store.as_deref()) {
        cfg.attribute_store = s.parse::<AttributeStore>().map_err(anyhow::Error::msg)?;
    }
    if let Some(s) = non_empty(parsed.jobs.as_deref()) {
        let jobs: usize = s.parse().with_context(|| format!("jobs: expected a number, got '{s}'"))?;
        cfg.jobs = (jobs > 0).then_some(jobs);
    }
    if let Some(s) = non_empty(parsed.include_hidden.as_deref()) {
        cfg.include_hidden = parse_bool("include_hidden", s)?;
    }
    Ok(cfg)
}

/// Load a Config from a specific XML file.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path).with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig =
        from_xml_str(&contents).with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in config xml '{}'", path.display()))
}

/// How the config was obtained.
#[derive(Debug)]
pub enum LoadResult {
    Loaded(PathBuf, Config),
    /// `$ECFMT_CONFIG` names a missing file; defaults apply.
    Missing(PathBuf),
    /// First run: a template was written to the default location; defaults apply.
    CreatedTemplate(PathBuf),
}

impl LoadResult {
    pub fn config(&self) -> Config {
        match self {
            LoadResult::Loaded(_, cfg) => cfg.clone(),
            LoadResult::Missing(_) | LoadResult::CreatedTemplate(_) => Config::default(),
        }
    }
}

/// Load the active config, creating a template at the default location if none exists.
pub fn load_or_init() -> Result<LoadResult> {
    let path = default_config_path()?;
    if path.exists() {
        let cfg = load_config_from_xml_path(&path)?;
        debug!(path = %path.display(), "config loaded");
        return Ok(LoadResult::Loaded(path, cfg));
    }
    if env::var_os(CONFIG_ENV).is_some() {
        return Ok(LoadResult::Missing(path));
    }
    create_template_config(&path)?;
    Ok(LoadResult::CreatedTemplate(path))
}

/// Write a commented template config at `path` (0600, parent 0700).
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!("refusing to create config: an ancestor of {} is a symlink", path.display());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create config dir '{}'", parent.display()))?;
        let _ = set_dir_mode_0700(parent);
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "/path/to/ecfmt.log".into());
    let content = format!(
        "<!--\n  ecfmt configuration (XML)\n\n    log_level        -> quiet | normal | info | debug\n    log_file         -> optional log file (console output is kept)\n    attribute_store  -> sidecar | xattr  (where the ENCODING of each file is remembered)\n    jobs             -> worker threads, empty = one per CPU\n    include_hidden   -> true | false  (walk into dot files and dot directories)\n\n  Formatting rules are given on the command line; CLI flags override these values.\n-->\n<config>\n  <log_level>normal</log_level>\n  <log_file></log_file>\n  <!-- <log_file>{suggested_log}</log_file> -->\n  <attribute_store>sidecar</attribute_store>\n  <jobs></jobs>\n  <include_hidden>false</include_hidden>\n</config>\n"
    );
    write_new_private(path, content.as_bytes())?;
    info!(path = %path.display(), "created template config");
    Ok(())
}
