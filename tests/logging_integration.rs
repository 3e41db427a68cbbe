use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use ecfmt::events::Tee;
use ecfmt::{EventSink, LineEnding, MemoryFile, RecordingSink, RuleSet, TaskEvent, TracingSink, run_formatting_task};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt as tsfmt, registry};

#[derive(Clone)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture<F: FnOnce()>(json: bool, f: F) -> String {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let make_writer = {
        let buf = buf.clone();
        move || BufferWriter(buf.clone())
    };
    let filter = EnvFilter::new("debug");
    let dispatch = if json {
        tracing::Dispatch::new(registry().with(filter).with(tsfmt::layer().json().with_writer(make_writer)))
    } else {
        tracing::Dispatch::new(
            registry().with(filter).with(tsfmt::layer().compact().with_ansi(false).with_writer(make_writer)),
        )
    };
    tracing::dispatcher::with_default(&dispatch, f);
    let guard = buf.lock().unwrap();
    String::from_utf8_lossy(&guard).into_owned()
}

#[test]
fn tracing_sink_logs_each_event_with_path() {
    let recorder = RecordingSink::new();
    let logs = capture(false, || {
        let file = MemoryFile::new("logged.txt", "x  \n");
        let sink = Tee(TracingSink, |e: &TaskEvent| recorder.emit(e));
        run_formatting_task(&file, &RuleSet::new(LineEnding::Lf, true), &sink).unwrap();
    });
    assert!(logs.contains("logged.txt: rewritten as UTF-8"), "logs: {logs}");
    assert!(logs.contains("path=logged.txt"), "logs: {logs}");
    for line in recorder.lines() {
        assert!(logs.contains(&line), "missing {line:?} in {logs}");
    }
}

#[test]
fn json_logs_carry_path_field() {
    let logs = capture(true, || {
        let file = MemoryFile::new("j.txt", "ok\n");
        run_formatting_task(&file, &RuleSet::default(), &TracingSink).unwrap();
    });
    let unchanged = logs
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
        .find(|v| v["fields"]["message"].as_str().is_some_and(|m| m.ends_with("already canonical")))
        .expect("unchanged event logged");
    assert_eq!(unchanged["fields"]["path"], "j.txt");
    assert_eq!(unchanged["level"], "DEBUG");
}

#[cfg(unix)]
#[test]
fn log_file_opens_privately() {
    use std::os::unix::fs::PermissionsExt;
    let td = tempfile::tempdir().unwrap();
    let path: PathBuf = td.path().join("logs").join("ecfmt.log");
    let mut f = ecfmt::platform::open_log_file_secure_append(&path).unwrap();
    writeln!(f, "hello").unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);
}
