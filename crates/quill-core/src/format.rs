//! # Line Formatting
//!
//! Turns a [`LogEvent`] into the single line handed to sinks:
//!
//! ```text
//! 03/07/2024 09:05:02.045 [INFO][server][http] listening on :8080
//! ```
//!
//! The line is the timestamp, the uppercased level tag, one bracketed tag per
//! name segment, a space, then the body. When an error trace is attached the
//! body is merged with it (see [`render_body`]). Colorized sinks receive the
//! same line passed through the level's [`ColorStyle`](crate::ColorStyle).

use std::borrow::Cow;
use std::error::Error;
use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::color::ColorMap;
use crate::level::{Level, LevelRegistry};
use crate::names::NameChain;
use crate::timestamp::format_timestamp;

/// A rendered error with its full trace
///
/// The first line of the trace is expected to look like `Kind: message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorTrace
{
    trace: String,
}

impl ErrorTrace
{
    /// Wrap a raw trace
    pub fn new(trace: impl Into<String>) -> Self
    {
        Self { trace: trace.into() }
    }

    /// Build a trace from an error and its source chain
    ///
    /// ```rust
    /// use quill_core::ErrorTrace;
    ///
    /// let err = std::io::Error::other("disk full");
    /// assert_eq!(ErrorTrace::from_error(&err).trace(), "Error: disk full");
    /// ```
    pub fn from_error<E: Error + ?Sized>(err: &E) -> Self
    {
        let mut trace = format!("Error: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = write!(trace, "\n    caused by: {cause}");
            source = cause.source();
        }
        Self { trace }
    }

    /// The full trace
    #[must_use]
    pub fn trace(&self) -> &str
    {
        &self.trace
    }

    /// The error's own message: the first trace line after its first colon
    ///
    /// Returns `None` when the trace is empty or the first line has no colon.
    #[must_use]
    pub fn message(&self) -> Option<&str>
    {
        let first = self.trace.lines().next()?;
        let (_, message) = first.split_once(':')?;
        Some(message.trim())
    }
}

/// One log call, reduced to a line as soon as it is dispatched
#[derive(Debug, Clone)]
pub struct LogEvent
{
    /// Severity
    pub level: Level,
    /// The already-substituted message
    pub message: String,
    /// Name chain of the emitting logger
    pub names: NameChain,
    /// Attached error, if any
    pub error: Option<ErrorTrace>,
}

impl LogEvent
{
    /// Create an event without an error
    pub fn new(level: Level, message: impl Into<String>, names: NameChain) -> Self
    {
        Self {
            level,
            message: message.into(),
            names,
            error: None,
        }
    }

    /// Attach an error trace
    #[must_use]
    pub fn with_error(mut self, error: ErrorTrace) -> Self
    {
        self.error = Some(error);
        self
    }
}

/// Merge a message with an optional error trace
///
/// - no trace, or a trace whose first line has no colon: the message alone
/// - the trace's own message equals `message`: the trace alone
/// - otherwise: `message`, a newline, then the trace
#[must_use]
pub fn render_body<'a>(message: &'a str, error: Option<&'a ErrorTrace>) -> Cow<'a, str>
{
    let Some(error) = error else {
        return Cow::Borrowed(message);
    };
    match error.message() {
        None => Cow::Borrowed(message),
        Some(own) if own == message => Cow::Borrowed(error.trace()),
        Some(_) => Cow::Owned(format!("{message}\n{}", error.trace())),
    }
}

/// Renders events using the current level registry and color map
#[derive(Debug, Clone, Copy)]
pub struct Formatter<'a>
{
    levels: &'a LevelRegistry,
    colors: &'a ColorMap,
}

impl<'a> Formatter<'a>
{
    /// Create a formatter over a configuration snapshot
    #[must_use]
    pub fn new(levels: &'a LevelRegistry, colors: &'a ColorMap) -> Self
    {
        Self { levels, colors }
    }

    /// Render `event` as if it happened at `at`
    ///
    /// With `colorize` the assembled line goes through the level's color
    /// style. Levels missing from the registry are never colored.
    #[must_use]
    pub fn render(&self, event: &LogEvent, at: &DateTime<Local>, colorize: bool) -> String
    {
        let line = Self::render_plain(event, at);
        if colorize {
            self.paint(&event.level, &line)
        } else {
            line
        }
    }

    /// Color an already assembled plain line
    #[must_use]
    pub fn paint(&self, level: &Level, line: &str) -> String
    {
        if self.levels.contains(level) {
            self.colors.paint(level, line)
        } else {
            line.to_string()
        }
    }

    /// Render without any color codes
    #[must_use]
    pub fn render_plain(event: &LogEvent, at: &DateTime<Local>) -> String
    {
        format!(
            "{} [{}]{} {}",
            format_timestamp(at),
            event.level.tag(),
            event.names,
            render_body(&event.message, event.error.as_ref())
        )
    }
}

#[cfg(test)]
mod tests
{
    use chrono::TimeZone;

    use super::*;
    use crate::color::AnsiColor;

    fn at() -> DateTime<Local>
    {
        Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    fn render(event: &LogEvent, colorize: bool) -> String
    {
        let levels = LevelRegistry::default();
        let colors = ColorMap::default();
        Formatter::new(&levels, &colors).render(event, &at(), colorize)
    }

    #[test]
    fn test_every_default_level_has_its_tag()
    {
        for (level, tag) in [
            (Level::Error, "[ERROR]"),
            (Level::Warn, "[WARN]"),
            (Level::Info, "[INFO]"),
            (Level::Debug, "[DEBUG]"),
        ] {
            let line = render(&LogEvent::new(level, "m", NameChain::root()), false);
            assert!(line.contains(tag), "{line} is missing {tag}");
        }
    }

    #[test]
    fn test_plain_line_layout()
    {
        let event = LogEvent::new(Level::Info, "hello", NameChain::root());
        assert_eq!(render(&event, false), "01/02/2024 03:04:05.000 [INFO] hello");
    }

    #[test]
    fn test_names_follow_level_tag()
    {
        let event = LogEvent::new(Level::Warn, "careful", NameChain::new(["a", "b"]));
        let line = render(&event, false);
        assert!(line.contains("[WARN][a][b] careful"));
    }

    #[test]
    fn test_colorized_only_adds_wrapper()
    {
        let event = LogEvent::new(Level::Error, "bad", NameChain::new(["x"]));
        let plain = render(&event, false);
        let colored = render(&event, true);
        assert_eq!(colored, format!("{}{plain}{}", AnsiColor::FgRed.code(), AnsiColor::Reset.code()));
    }

    #[test]
    fn test_unregistered_level_is_not_colored()
    {
        let levels: LevelRegistry = [("fatal", 0)].into_iter().collect();
        let colors = ColorMap::default();
        let event = LogEvent::new(Level::Info, "still here", NameChain::root());
        let line = Formatter::new(&levels, &colors).render(&event, &at(), true);
        assert_eq!(line, "01/02/2024 03:04:05.000 [INFO] still here");
    }

    #[test]
    fn test_matching_error_message_is_not_duplicated()
    {
        let trace = "Error: boom\n    at main (app.rs:1)";
        let event = LogEvent::new(Level::Error, "boom", NameChain::root()).with_error(ErrorTrace::new(trace));
        assert_eq!(render(&event, false), format!("01/02/2024 03:04:05.000 [ERROR] {trace}"));
    }

    #[test]
    fn test_different_error_message_is_appended()
    {
        let trace = "Error: boom\n    at main (app.rs:1)";
        let event = LogEvent::new(Level::Error, "context", NameChain::root()).with_error(ErrorTrace::new(trace));
        assert_eq!(
            render(&event, false),
            format!("01/02/2024 03:04:05.000 [ERROR] context\n{trace}")
        );
    }

    #[test]
    fn test_trace_without_colon_falls_back_to_message()
    {
        let error = ErrorTrace::new("something odd happened");
        assert_eq!(render_body("context", Some(&error)), "context");
        assert_eq!(render_body("context", Some(&ErrorTrace::new(""))), "context");
    }

    #[test]
    fn test_error_message_is_trimmed()
    {
        let error = ErrorTrace::new("TypeError:   spaced out  \nline two");
        assert_eq!(error.message(), Some("spaced out"));
        assert_eq!(render_body("spaced out", Some(&error)), error.trace());
    }

    #[test]
    fn test_trace_from_error_chain()
    {
        #[derive(Debug)]
        struct Outer(std::io::Error);

        impl std::fmt::Display for Outer
        {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
            {
                f.write_str("request failed")
            }
        }

        impl Error for Outer
        {
            fn source(&self) -> Option<&(dyn Error + 'static)>
            {
                Some(&self.0)
            }
        }

        let err = Outer(std::io::Error::other("connection reset"));
        let trace = ErrorTrace::from_error(&err);
        assert_eq!(trace.trace(), "Error: request failed\n    caused by: connection reset");
        assert_eq!(trace.message(), Some("request failed"));
    }
}
