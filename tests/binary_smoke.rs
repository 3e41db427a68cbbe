use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::process::Command;

fn ecfmt(config_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ecfmt"));
    // Point at a config that does not exist: defaults apply, nothing is created in $HOME.
    cmd.env("ECFMT_CONFIG", config_dir.path().join("config.xml"));
    cmd
}

#[test]
fn print_config_succeeds() {
    let cfg = TempDir::new().unwrap();
    let out = ecfmt(&cfg).arg("--print-config").output().expect("spawn binary");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("ECFMT_CONFIG"), "stdout: {stdout}");
}

#[test]
fn formats_directory_in_place() {
    let cfg = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    work.child("a.txt").write_str("a  \r\nb\t\r\n").unwrap();
    work.child("nested/b.txt").write_str("clean\n").unwrap();

    let out = ecfmt(&cfg)
        .args(["--trim-trailing-whitespace", "--end-of-line", "lf"])
        .arg(work.path())
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    work.child("a.txt").assert("a\nb\n");
    work.child("nested/b.txt").assert("clean\n");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("formatted"), "stdout: {stdout}");
}

#[test]
fn check_mode_exits_nonzero_without_writing() {
    let cfg = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let dirty = work.child("dirty.txt");
    dirty.write_str("x \n").unwrap();

    let out = ecfmt(&cfg).args(["--check", "--trim-trailing-whitespace"]).arg(dirty.path()).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    dirty.assert("x \n");

    dirty.write_str("x\n").unwrap();
    let out = ecfmt(&cfg).args(["--check", "--trim-trailing-whitespace"]).arg(dirty.path()).output().unwrap();
    assert!(out.status.success());
}

#[test]
fn decode_failure_exits_nonzero() {
    let cfg = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    work.child("odd.txt").write_binary(&[0xFF, 0xFE, 0x41]).unwrap();
    let out = ecfmt(&cfg).arg(work.path()).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn invalid_rule_value_is_a_usage_error() {
    let cfg = TempDir::new().unwrap();
    let out = ecfmt(&cfg).args(["--end-of-line", "dos", "."]).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn unknown_config_element_is_fatal() {
    let cfg = TempDir::new().unwrap();
    cfg.child("config.xml").write_str("<config><indent_size>5</indent_size></config>").unwrap();
    let work = TempDir::new().unwrap();
    work.child("a.txt").write_str("a").unwrap();
    let out = ecfmt(&cfg).arg(work.path()).output().unwrap();
    assert!(!out.status.success());
}

#[test]
fn binary_files_in_walk_are_left_alone() {
    let cfg = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x10\x00\x00\x00\x10\x08\x06\x00\x00\x00";
    work.child("logo.png").write_binary(png).unwrap();
    let out = ecfmt(&cfg).args(["--trim-trailing-whitespace"]).arg(work.path()).output().unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(std::fs::read(work.path().join("logo.png")).unwrap(), png.to_vec());
}
