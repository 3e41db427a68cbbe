//! Application orchestrator.
//! Loads and merges config, initializes logging, installs the Ctrl-C handler,
//! expands the given paths and runs the batch.

use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{debug, info};

use ecfmt::batch::{BatchOptions, Summary, collect_files, run_batch};
use ecfmt::cli::Args;
use ecfmt::config::{CONFIG_ENV, LoadResult, default_config_path, load_or_init};
use ecfmt::output as out;
use ecfmt::{Cancellation, EncodingResolver, TracingSink};

use crate::logging::init_tracing;

const EXIT_INTERRUPTED: u8 = 130;

fn print_config_location() {
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {p}"));
        return;
    }
    match default_config_path() {
        Ok(p) => {
            out::print_info(&format!("Default ecfmt config path:\n  {}", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet; one is created on the next run.");
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a default config path: {e}")),
    }
}

fn report(summary: &Summary, check: bool) {
    for path in &summary.changed {
        out::print_user(&format!("formatted {}", path.display()));
    }
    for path in &summary.pending {
        out::print_user(&format!("would format {}", path.display()));
    }
    for (path, error) in &summary.failed {
        out::print_error(&format!("{}: {error}", path.display()));
    }
    let verb = if check { "would change" } else { "changed" };
    let touched = summary.changed.len() + summary.pending.len();
    let line = format!(
        "{} file(s): {touched} {verb}, {} unchanged, {} binary skipped, {} failed",
        summary.total(),
        summary.unchanged,
        summary.skipped,
        summary.failed.len()
    );
    if summary.failed.is_empty() {
        out::print_success(&line);
    } else {
        out::print_warn(&line);
    }
    if summary.cancelled > 0 {
        out::print_warn(&format!("{} file(s) skipped after interrupt", summary.cancelled));
    }
}

/// Run the CLI application and pick the process exit status.
pub fn run(args: Args) -> Result<ExitCode> {
    if args.print_config {
        print_config_location();
        return Ok(ExitCode::SUCCESS);
    }

    let loaded = load_or_init()?;
    if let LoadResult::CreatedTemplate(path) = &loaded {
        out::print_info(&format!("Wrote a template config to {}", path.display()));
    }
    let mut cfg = loaded.config();
    args.apply_overrides(&mut cfg);
    cfg.validate()?;

    let _guard = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json).inspect_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
    })?;
    if let LoadResult::Loaded(path, _) | LoadResult::Missing(path) = &loaded {
        debug!(config = %path.display(), "configuration resolved");
    }

    let cancel = Cancellation::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            cancel.cancel();
            out::print_warn("Received interrupt; finishing in-flight writes...");
        })
        .context("failed to install signal handler")?;
    }

    let rules = args.rule_set();
    debug!(?rules, ?cfg, "starting ecfmt");
    let files = collect_files(&args.paths, cfg.include_hidden)?;
    let opts = BatchOptions {
        jobs: cfg.jobs,
        dry_run: cfg.dry_run,
        store: cfg.attribute_store,
    };
    let summary = run_batch(&files, &rules, &EncodingResolver::new(), &TracingSink, &cancel, &opts)?;
    info!(
        changed = summary.changed.len(),
        pending = summary.pending.len(),
        unchanged = summary.unchanged,
        skipped = summary.skipped,
        failed = summary.failed.len(),
        "run finished"
    );

    report(&summary, args.check || cfg.dry_run);

    let status = if cancel.is_cancelled() {
        ExitCode::from(EXIT_INTERRUPTED)
    } else if !summary.failed.is_empty() || (args.check && !summary.pending.is_empty()) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    };
    Ok(status)
}
