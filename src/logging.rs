//! Tracing initialization.
//! EnvFilter from the configured LogLevel, compact or JSON console output on stderr,
//! and an optional non-blocking file layer.
//!
//! A log file under a symlinked ancestor is refused; the run continues with
//! console logging only.

use anyhow::Result;
use chrono::Local;
use ecfmt::output as out;
use ecfmt::platform::open_log_file_secure_append;
use ecfmt::{LogLevel, path_has_symlink_ancestor};
use std::fmt as stdfmt;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// DD/MM/YY HH:MM:SS in local time.
struct LocalHumanTime;

impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

fn to_level_filter(lvl: LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::INFO,
        LogLevel::Info => LevelFilter::DEBUG,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

fn fmt_layer<W>(writer: W, json: bool, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if json {
        tsfmt::layer()
            .event_format(tsfmt::format().json())
            .with_timer(LocalHumanTime)
            .with_level(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(writer)
            .boxed()
    } else {
        tsfmt::layer()
            .with_timer(LocalHumanTime)
            .with_level(true)
            .with_target(false)
            .with_thread_ids(true)
            .with_ansi(ansi)
            .compact()
            .with_writer(writer)
            .boxed()
    }
}

fn open_file_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(false) => {}
        Ok(true) => {
            out::print_warn(&format!(
                "not logging to {}: an ancestor directory is a symlink",
                path.display()
            ));
            return None;
        }
        Err(e) => {
            out::print_warn(&format!("not logging to {}: {e}", path.display()));
            return None;
        }
    }
    match open_log_file_secure_append(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            out::print_warn(&format!("failed to open log file {}: {e}", path.display()));
            None
        }
    }
}

/// Install the global subscriber. Hold the returned guard until exit so buffered
/// file logs are flushed.
pub fn init_tracing(lvl: LogLevel, log_file: Option<&Path>, json: bool) -> Result<Option<WorkerGuard>> {
    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(std::io::stderr, json, atty::is(atty::Stream::Stderr))];
    let mut guard = None;
    if let Some((writer, g)) = log_file.and_then(open_file_writer) {
        layers.push(fmt_layer(writer, json, false));
        guard = Some(g);
    }
    let filter = EnvFilter::default().add_directive(to_level_filter(lvl).into());
    Registry::default().with(layers).with(filter).try_init()?;
    Ok(guard)
}
