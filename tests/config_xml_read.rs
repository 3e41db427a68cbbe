use assert_fs::TempDir;
use assert_fs::prelude::*;
use serial_test::serial;

use ecfmt::config::{LoadResult, load_or_init};
use ecfmt::{AttributeStore, LogLevel, default_config_path, default_log_path};

struct EnvGuard;

impl EnvGuard {
    fn set(value: &std::path::Path) -> Self {
        unsafe { std::env::set_var("ECFMT_CONFIG", value) };
        EnvGuard
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe { std::env::remove_var("ECFMT_CONFIG") };
    }
}

#[test]
#[serial]
fn env_override_controls_config_and_log_paths() {
    let tmp = TempDir::new().unwrap();
    let cfg = tmp.path().join("custom.xml");
    let _env = EnvGuard::set(&cfg);
    assert_eq!(default_config_path().unwrap(), cfg);
    assert_eq!(default_log_path().unwrap().parent(), cfg.parent());
}

#[test]
#[serial]
fn loads_values_from_env_config() {
    let tmp = TempDir::new().unwrap();
    let cfg = tmp.child("config.xml");
    cfg.write_str(
        r#"<config>
  <log_level> info </log_level>
  <attribute_store>sidecar</attribute_store>
  <jobs>4</jobs>
  <include_hidden>yes</include_hidden>
</config>"#,
    )
    .unwrap();
    let _env = EnvGuard::set(cfg.path());
    match load_or_init().unwrap() {
        LoadResult::Loaded(path, c) => {
            assert_eq!(path, cfg.path());
            assert_eq!(c.log_level, LogLevel::Info);
            assert_eq!(c.attribute_store, AttributeStore::Sidecar);
            assert_eq!(c.jobs, Some(4));
            assert!(c.include_hidden);
            assert_eq!(c.log_file, None);
        }
        other => panic!("expected Loaded, got {other:?}"),
    }
}

#[test]
#[serial]
fn missing_env_config_uses_defaults_without_creating() {
    let tmp = TempDir::new().unwrap();
    let cfg = tmp.path().join("absent.xml");
    let _env = EnvGuard::set(&cfg);
    let result = load_or_init().unwrap();
    assert!(matches!(result, LoadResult::Missing(_)));
    assert_eq!(result.config(), ecfmt::Config::default());
    assert!(!cfg.exists());
}

#[test]
#[serial]
fn bad_values_are_reported() {
    let tmp = TempDir::new().unwrap();
    let cfg = tmp.child("config.xml");
    cfg.write_str("<config><jobs>many</jobs></config>").unwrap();
    let _env = EnvGuard::set(cfg.path());
    let err = load_or_init().unwrap_err();
    assert!(format!("{err:#}").contains("jobs"));
}
