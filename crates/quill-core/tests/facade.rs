//! End-to-end tests for the logging facade

use std::fs;
use std::io;
use std::sync::Arc;

use chrono::{Duration, Local, TimeZone};
use quill_core::sink::resolve_pointer;
use quill_core::{
    AnsiColor, ColorMap, ColorStyle, ErrorTrace, Level, ManualClock, MemorySink, Quill, QuillError, Sink,
    SinkErrorPolicy,
};

fn clock() -> ManualClock
{
    ManualClock::new(Local.with_ymd_and_hms(2024, 6, 30, 22, 15, 30).unwrap() + Duration::milliseconds(7))
}

fn quiet(clock: &ManualClock) -> (Quill, MemorySink)
{
    let capture = MemorySink::new();
    let quill = Quill::builder()
        .without_console()
        .clock(Arc::new(clock.clone()))
        .sink(capture.clone())
        .build()
        .unwrap();
    (quill, capture)
}

struct RefusingSink;

impl Sink for RefusingSink
{
    fn name(&self) -> &str
    {
        "refusing"
    }

    fn write_line(&self, _line: &str) -> io::Result<()>
    {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only filesystem"))
    }
}

#[test]
fn test_line_format()
{
    let (quill, capture) = quiet(&clock());
    quill.get_logger(["a", "b"]).info("ready");
    assert_eq!(capture.lines(), vec!["06/30/2024 22:15:30.007 [INFO][a][b] ready"]);
}

#[test]
fn test_timestamp_taken_at_render_time()
{
    let clock = clock();
    let (quill, capture) = quiet(&clock);
    let log = quill.logger();
    log.info("first");
    clock.advance(Duration::seconds(5));
    log.info("second");
    let lines = capture.lines();
    assert!(lines[0].starts_with("06/30/2024 22:15:30.007"));
    assert!(lines[1].starts_with("06/30/2024 22:15:35.007"));
}

#[test]
fn test_child_chain_matches_direct_chain()
{
    let (quill, capture) = quiet(&clock());
    quill.get_logger(["x"]).get_logger(["y"]).info("same");
    quill.get_logger(["x", "y"]).info("same");
    let lines = capture.lines();
    assert_eq!(lines[0], lines[1]);
}

#[test]
fn test_format_macros_substitute_arguments()
{
    let (quill, capture) = quiet(&clock());
    let log = quill.get_logger(["worker"]);
    quill_core::debug!(log, "{} + {} = {}", 1, 2, 3);
    quill_core::error!(log, "failed after {attempts} attempts", attempts = 4);
    assert!(capture.contains("[DEBUG][worker] 1 + 2 = 3"));
    assert!(capture.contains("[ERROR][worker] failed after 4 attempts"));
}

#[test]
fn test_console_style_colors()
{
    let clock = clock();
    let colored = MemorySink::new().with_colors(true);
    let quill = Quill::builder()
        .without_console()
        .clock(Arc::new(clock))
        .colors(ColorMap::default().with(Level::Info, ColorStyle::Ansi(AnsiColor::FgBlue)))
        .sink(colored.clone())
        .build()
        .unwrap();
    quill.logger().info("blue");
    assert_eq!(
        colored.lines()[0],
        "\x1b[34m06/30/2024 22:15:30.007 [INFO] blue\x1b[0m"
    );
}

#[test]
fn test_raw_trace_merge()
{
    let (quill, capture) = quiet(&clock());
    let log = quill.logger();
    let trace = "Error: boom\n    at handler (src/main.rs:10)";
    log.log_with(Level::Error, "boom", ErrorTrace::new(trace));
    log.log_with(Level::Error, "context", ErrorTrace::new(trace));
    log.log_with(Level::Error, "no colon", ErrorTrace::new("panicked"));

    let contents = capture.contents();
    assert_eq!(
        contents,
        format!(
            "06/30/2024 22:15:30.007 [ERROR] {trace}\n\
             06/30/2024 22:15:30.007 [ERROR] context\n{trace}\n\
             06/30/2024 22:15:30.007 [ERROR] no colon\n"
        )
    );
}

#[test]
fn test_save_to_file_writes_plain_lines()
{
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let (quill, _capture) = quiet(&clock());
    quill.set_colors(ColorMap::default());
    let id = quill.save_to_file(&path).unwrap();

    quill.get_logger(["disk"]).warn("written");
    quill.remove_transport(id);

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "06/30/2024 22:15:30.007 [WARN][disk] written\n"
    );
}

#[test]
fn test_removed_file_sink_keeps_earlier_lines()
{
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let (quill, capture) = quiet(&clock());
    let id = quill.save_to_file(&path).unwrap();

    let log = quill.logger();
    log.info("kept");
    assert!(quill.remove_transport(id).is_some());
    log.info("not in file");

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("kept"));
    assert!(!contents.contains("not in file"));
    assert!(capture.contains("not in file"));
}

#[test]
fn test_save_to_file_failure_is_reported()
{
    let dir = tempfile::tempdir().unwrap();
    let (quill, capture) = quiet(&clock());

    let err = quill.save_to_file(dir.path()).unwrap_err();
    assert!(matches!(err, QuillError::OpenSink { .. }));
    assert!(capture.contains("[ERROR][quill] Failed to open log file"));
    assert_eq!(quill.transports().len(), 1);
}

#[test]
fn test_save_to_file_failure_can_be_silent()
{
    let dir = tempfile::tempdir().unwrap();
    let (quill, capture) = quiet(&clock());
    quill.set_sink_error_policy(SinkErrorPolicy::Ignore);

    assert!(quill.save_to_file(dir.path()).is_err());
    assert!(capture.is_empty());
}

#[test]
fn test_failing_sink_does_not_stop_dispatch()
{
    let clock = clock();
    let before = MemorySink::new();
    let after = MemorySink::new();
    let quill = Quill::builder()
        .without_console()
        .clock(Arc::new(clock))
        .sink(before.clone())
        .sink(RefusingSink)
        .sink(after.clone())
        .build()
        .unwrap();

    quill.logger().info("delivered");

    assert!(before.contains("[INFO] delivered"));
    assert!(after.contains("[INFO] delivered"));
    assert!(after.contains("[ERROR][quill] Log sink 'refusing' failed: read-only filesystem"));
}

#[test]
fn test_rotating_file_across_dates()
{
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap());
    let (quill, _capture) = quiet(&clock);
    let id = quill.save_to_rotating_file(dir.path()).unwrap();
    let log = quill.get_logger(["nightly"]);

    log.info("before midnight");
    clock.advance(Duration::seconds(2));
    log.info("after midnight");
    quill.remove_transport(id);

    let first = dir.path().join("06-30-2024.log");
    let second = dir.path().join("07-01-2024.log");
    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        "06/30/2024 23:59:59.000 [INFO][nightly] before midnight\n"
    );
    assert_eq!(
        fs::read_to_string(&second).unwrap(),
        "07/01/2024 00:00:01.000 [INFO][nightly] after midnight\n"
    );
    assert_eq!(resolve_pointer(&dir.path().join("current.log")).unwrap(), second);
}

#[test]
fn test_shutdown_then_new_sink()
{
    let (quill, capture) = quiet(&clock());
    quill.shutdown();
    assert!(capture.is_closed());
    assert!(quill.transports().is_empty());

    let fresh = MemorySink::new();
    quill.add_transport(fresh.clone());
    quill.logger().info("again");
    assert_eq!(fresh.len(), 1);
    assert!(capture.is_empty());
}
