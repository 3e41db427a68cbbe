use clap::Parser;
use std::path::PathBuf;

use ecfmt::cli::Args;
use ecfmt::{AttributeStore, Config, Encoding, FinalNewline, IndentStyle, LineEnding, LogLevel};

#[test]
fn defaults_leave_rules_unset() {
    let args = Args::try_parse_from(["ecfmt", "src"]).unwrap();
    assert_eq!(args.paths, vec![PathBuf::from("src")]);
    let rules = args.rule_set();
    assert_eq!(rules.line_ending, LineEnding::Lf);
    assert!(!rules.trim_trailing_whitespace);
    assert_eq!(rules.final_newline, FinalNewline::Unset);
    assert_eq!(rules.indent_style, None);
    assert_eq!(rules.charset, None);
}

#[test]
fn rule_flags_build_rule_set() {
    let args = Args::try_parse_from([
        "ecfmt",
        "--end-of-line",
        "crlf",
        "--trim-trailing-whitespace",
        "--final-newline",
        "insert",
        "--indent-style",
        "space",
        "--tab-width",
        "8",
        "--charset",
        "latin1",
        "a.txt",
        "b.txt",
    ])
    .unwrap();
    let rules = args.rule_set();
    assert_eq!(rules.line_ending, LineEnding::CrLf);
    assert!(rules.trim_trailing_whitespace);
    assert_eq!(rules.final_newline, FinalNewline::Insert);
    assert_eq!(rules.indent_style, Some(IndentStyle::Space));
    assert_eq!(rules.tab_width, 8);
    assert_eq!(rules.charset, Encoding::for_name("windows-1252"));
    assert_eq!(args.paths.len(), 2);
}

#[test]
fn rejects_bad_values() {
    assert!(Args::try_parse_from(["ecfmt"]).is_err());
    assert!(Args::try_parse_from(["ecfmt", "--check"]).is_err());
    assert!(Args::try_parse_from(["ecfmt", "--charset", "nope", "a"]).is_err());
    assert!(Args::try_parse_from(["ecfmt", "--tab-width", "0", "a"]).is_err());
    assert!(Args::try_parse_from(["ecfmt", "--attribute-store", "db", "a"]).is_err());
}

#[test]
fn overrides_apply_on_top_of_config() {
    let args = Args::try_parse_from([
        "ecfmt",
        "-d",
        "--jobs",
        "2",
        "--attribute-store",
        "xattr",
        "--check",
        "--include-hidden",
        "x",
    ])
    .unwrap();
    let mut cfg = Config {
        log_level: LogLevel::Quiet,
        jobs: Some(8),
        ..Config::default()
    };
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert_eq!(cfg.jobs, Some(2));
    assert_eq!(cfg.attribute_store, AttributeStore::Xattr);
    assert!(cfg.include_hidden);
    assert!(cfg.dry_run, "--check implies no writes");
}

#[test]
fn unset_flags_keep_config_values() {
    let args = Args::try_parse_from(["ecfmt", "x"]).unwrap();
    let mut cfg = Config {
        log_level: LogLevel::Info,
        jobs: Some(3),
        include_hidden: true,
        ..Config::default()
    };
    let before = cfg.clone();
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg, before);
}

#[test]
fn print_config_needs_no_paths() {
    let args = Args::try_parse_from(["ecfmt", "--print-config"]).unwrap();
    assert!(args.print_config);
    assert!(args.paths.is_empty());
}
