//! # Logger Facade
//!
//! [`Quill`] is the logging context: the level registry, color map,
//! threshold and registered sinks. [`Logger`] is what application code
//! holds: a handle to the context plus a fixed [`NameChain`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quill_core::Quill;
//!
//! let quill = Quill::new();
//! quill.save_to_rotating_file("logs").expect("Failed to open log directory");
//!
//! let log = quill.logger().get_logger(["server"]);
//! log.info("listening");
//!
//! let http = log.get_logger(["http"]);
//! quill_core::warn!(http, "slow request took {}ms", 1200);
//!
//! quill.shutdown();
//! ```
//!
//! ## Configuration changes
//!
//! The configuration is an immutable snapshot behind a lock. Setters build a
//! new snapshot and swap it in, so a log call racing a setter sees either the
//! old or the new configuration, never a mix.

use std::error::Error;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::color::ColorMap;
use crate::config::QuillConfig;
use crate::error::QuillResult;
use crate::format::{ErrorTrace, Formatter, LogEvent};
use crate::level::{Level, LevelRegistry};
use crate::names::NameChain;
use crate::sink::{ConsoleSink, ConsoleTarget, FileSink, RotatingFileSink, Sink};
use crate::timestamp::{Clock, SystemClock};
use crate::transport::{SinkErrorPolicy, TransportId, TransportManager};

#[derive(Debug, Clone)]
struct Settings
{
    levels: LevelRegistry,
    colors: ColorMap,
    threshold: Level,
    policy: SinkErrorPolicy,
}

struct Inner
{
    settings: RwLock<Arc<Settings>>,
    transports: TransportManager,
    clock: Arc<dyn Clock>,
}

impl Drop for Inner
{
    fn drop(&mut self)
    {
        self.transports.shutdown();
    }
}

static GLOBAL: Lazy<Quill> = Lazy::new(|| {
    let config = QuillConfig::from_env().unwrap_or_else(|error| {
        tracing::warn!(%error, "invalid logging environment, using defaults");
        QuillConfig::default()
    });
    Quill::from_config(config).unwrap_or_else(|error| {
        tracing::warn!(%error, "failed to open configured log sinks, using console only");
        Quill::new()
    })
});

/// A logging context: configuration plus registered sinks
///
/// Cloning is cheap and every clone shares the same state. The sinks are
/// closed by [`Quill::shutdown`] or when the last clone (and every
/// [`Logger`] derived from it) is dropped.
#[derive(Clone)]
pub struct Quill
{
    inner: Arc<Inner>,
}

impl Quill
{
    /// Default configuration with a colorized stdout sink
    #[must_use]
    pub fn new() -> Self
    {
        let quill = Self::empty(QuillConfig::default(), Arc::new(SystemClock));
        quill.add_transport(ConsoleSink::stdout());
        quill
    }

    /// Start configuring a context
    #[must_use]
    pub fn builder() -> QuillBuilder
    {
        QuillBuilder::new()
    }

    /// Build a context and open the sinks `config` asks for
    ///
    /// ## Errors
    ///
    /// Returns the error from opening the configured file or directory.
    pub fn from_config(config: QuillConfig) -> QuillResult<Self>
    {
        QuillBuilder::new().config(config).build()
    }

    /// The process-wide context, configured from the environment on first use
    ///
    /// See [`QuillConfig::from_env`] for the variables read. If the
    /// environment is invalid or a configured sink cannot be opened, the
    /// context falls back to the defaults.
    ///
    /// Statics are never dropped, so the global context does not close its
    /// sinks on its own. Hold the guard from [`Quill::init_global`] in
    /// `main`, or call `Quill::global().shutdown()` before exiting, or lines
    /// still queued for file sinks are lost.
    pub fn global() -> &'static Quill
    {
        &GLOBAL
    }

    /// Create the global context now and return a guard that shuts it down
    ///
    /// ```rust,no_run
    /// use quill_core::Quill;
    ///
    /// let _guard = Quill::init_global();
    /// Quill::global().logger().info("started");
    /// // File sinks are drained when `_guard` goes out of scope
    /// ```
    #[must_use = "dropping the guard immediately shuts the global context down"]
    pub fn init_global() -> GlobalGuard
    {
        Lazy::force(&GLOBAL);
        GlobalGuard { _private: () }
    }

    fn empty(config: QuillConfig, clock: Arc<dyn Clock>) -> Self
    {
        let settings = Settings {
            levels: config.levels,
            colors: config.colors,
            threshold: config.threshold,
            policy: config.sink_error_policy,
        };
        Self {
            inner: Arc::new(Inner {
                settings: RwLock::new(Arc::new(settings)),
                transports: TransportManager::new(),
                clock,
            }),
        }
    }

    /// The root logger, with an empty name chain
    #[must_use]
    pub fn logger(&self) -> Logger
    {
        Logger {
            quill: self.clone(),
            names: NameChain::root(),
        }
    }

    /// Shortcut for `self.logger().get_logger(names)`
    #[must_use]
    pub fn get_logger<I, S>(&self, names: I) -> Logger
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.logger().get_logger(names)
    }

    fn settings(&self) -> Arc<Settings>
    {
        self.inner
            .settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, change: impl FnOnce(&mut Settings))
    {
        let mut guard = self.inner.settings.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Settings::clone(&guard);
        change(&mut next);
        *guard = Arc::new(next);
    }

    /// Replace the level registry
    ///
    /// Existing call sites are not checked. Events at a level missing from
    /// the new registry still render, with their literal tag, no color and
    /// no threshold filtering.
    pub fn set_levels(&self, levels: LevelRegistry) -> &Self
    {
        self.update(|settings| settings.levels = levels);
        self
    }

    /// Replace the color map
    pub fn set_colors(&self, colors: ColorMap) -> &Self
    {
        self.update(|settings| settings.colors = colors);
        self
    }

    /// Set the least severe level that is still emitted
    pub fn set_level(&self, threshold: impl Into<Level>) -> &Self
    {
        let threshold = threshold.into();
        self.update(|settings| settings.threshold = threshold);
        self
    }

    /// Choose what happens when a sink fails to write
    pub fn set_sink_error_policy(&self, policy: SinkErrorPolicy) -> &Self
    {
        self.update(|settings| settings.policy = policy);
        self
    }

    /// Current level registry
    #[must_use]
    pub fn levels(&self) -> LevelRegistry
    {
        self.settings().levels.clone()
    }

    /// Current threshold
    #[must_use]
    pub fn level(&self) -> Level
    {
        self.settings().threshold.clone()
    }

    /// Whether an event at `level` would be emitted
    #[must_use]
    pub fn is_enabled(&self, level: &Level) -> bool
    {
        let settings = self.settings();
        settings.levels.allows(level, &settings.threshold)
    }

    /// Register a sink after all existing ones
    pub fn add_transport<S: Sink + 'static>(&self, sink: S) -> TransportId
    {
        self.inner.transports.add(Arc::new(sink))
    }

    /// Register a sink that is shared with other owners
    pub fn add_shared_transport(&self, sink: Arc<dyn Sink>) -> TransportId
    {
        self.inner.transports.add(sink)
    }

    /// Unregister and close a sink, returning it if it was registered
    pub fn remove_transport(&self, id: TransportId) -> Option<Arc<dyn Sink>>
    {
        self.inner.transports.remove(id)
    }

    /// Append every line (uncolored) to `path`
    ///
    /// ## Errors
    ///
    /// Returns the error from opening the file. Under
    /// [`SinkErrorPolicy::Report`] the failure is also logged at `error`
    /// level through the sinks already registered.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> QuillResult<TransportId>
    {
        let sink = self.report_setup(FileSink::open(path))?;
        Ok(self.add_transport(sink))
    }

    /// Append every line (uncolored) to `<directory>/<MM-DD-YYYY>.log`
    ///
    /// The dated file is chosen again on every write and
    /// `<directory>/current.log` always points at the active one.
    ///
    /// ## Errors
    ///
    /// Returns the error from creating the directory. Under
    /// [`SinkErrorPolicy::Report`] the failure is also logged at `error`
    /// level through the sinks already registered.
    pub fn save_to_rotating_file(&self, directory: impl AsRef<Path>) -> QuillResult<TransportId>
    {
        let sink = self.report_setup(RotatingFileSink::with_clock(directory, self.inner.clock.clone()))?;
        Ok(self.add_transport(sink))
    }

    fn report_setup<S>(&self, opened: QuillResult<S>) -> QuillResult<S>
    {
        if let Err(error) = &opened {
            tracing::warn!(%error, "failed to open log sink");
            if self.settings().policy == SinkErrorPolicy::Report {
                self.get_logger([crate::transport::FAILURE_SOURCE]).error(error);
            }
        }
        opened
    }

    /// Ids of the registered sinks in dispatch order
    #[must_use]
    pub fn transports(&self) -> Vec<TransportId>
    {
        self.inner.transports.ids()
    }

    /// Flush every sink
    pub fn flush(&self)
    {
        self.inner.transports.flush();
    }

    /// Close and unregister every sink
    ///
    /// The context stays usable; events logged afterwards go nowhere until
    /// a new sink is added.
    pub fn shutdown(&self)
    {
        self.inner.transports.shutdown();
    }

    /// Render and dispatch one event
    ///
    /// The timestamp is taken here, at render time.
    pub fn emit(&self, event: &LogEvent)
    {
        let settings = self.settings();
        if !settings.levels.allows(&event.level, &settings.threshold) {
            return;
        }
        let at = self.inner.clock.now();
        let formatter = Formatter::new(&settings.levels, &settings.colors);
        self.inner.transports.dispatch(event, &formatter, &at, settings.policy);
    }
}

impl Default for Quill
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl fmt::Debug for Quill
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let settings = self.settings();
        f.debug_struct("Quill")
            .field("levels", &settings.levels)
            .field("threshold", &settings.threshold)
            .field("policy", &settings.policy)
            .field("transports", &self.inner.transports)
            .finish_non_exhaustive()
    }
}

/// Shuts down [`Quill::global`] when dropped
#[derive(Debug)]
pub struct GlobalGuard
{
    _private: (),
}

impl Drop for GlobalGuard
{
    fn drop(&mut self)
    {
        GLOBAL.shutdown();
    }
}

/// Builder for a [`Quill`] context
///
/// ```rust
/// use quill_core::{Level, MemorySink, Quill};
///
/// let capture = MemorySink::new();
/// let quill = Quill::builder()
///     .without_console()
///     .threshold(Level::Info)
///     .sink(capture.clone())
///     .build()
///     .unwrap();
///
/// quill.logger().debug("hidden");
/// quill.logger().info("shown");
/// assert_eq!(capture.len(), 1);
/// ```
pub struct QuillBuilder
{
    config: QuillConfig,
    clock: Arc<dyn Clock>,
    sinks: Vec<Arc<dyn Sink>>,
}

impl QuillBuilder
{
    /// Start from the default configuration
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            config: QuillConfig::default(),
            clock: Arc::new(SystemClock),
            sinks: Vec::new(),
        }
    }

    /// Replace the whole configuration
    #[must_use]
    pub fn config(mut self, config: QuillConfig) -> Self
    {
        self.config = config;
        self
    }

    /// Level registry
    #[must_use]
    pub fn levels(mut self, levels: LevelRegistry) -> Self
    {
        self.config.levels = levels;
        self
    }

    /// Color map
    #[must_use]
    pub fn colors(mut self, colors: ColorMap) -> Self
    {
        self.config.colors = colors;
        self
    }

    /// Least severe level that is still emitted
    #[must_use]
    pub fn threshold(mut self, threshold: impl Into<Level>) -> Self
    {
        self.config.threshold = threshold.into();
        self
    }

    /// Console stream
    #[must_use]
    pub fn console(mut self, target: ConsoleTarget) -> Self
    {
        self.config.console = Some(target);
        self
    }

    /// No console sink
    #[must_use]
    pub fn without_console(mut self) -> Self
    {
        self.config.console = None;
        self
    }

    /// Console colors on or off
    #[must_use]
    pub fn console_colors(mut self, colorize: bool) -> Self
    {
        self.config.colorize_console = colorize;
        self
    }

    /// Single log file
    #[must_use]
    pub fn file(mut self, path: impl Into<std::path::PathBuf>) -> Self
    {
        self.config.file = Some(path.into());
        self
    }

    /// Directory for date-rotated files
    #[must_use]
    pub fn rotating_dir(mut self, directory: impl Into<std::path::PathBuf>) -> Self
    {
        self.config.rotate_dir = Some(directory.into());
        self
    }

    /// Sink failure policy
    #[must_use]
    pub fn sink_error_policy(mut self, policy: SinkErrorPolicy) -> Self
    {
        self.config.sink_error_policy = policy;
        self
    }

    /// Clock used for timestamps and rotating file dates
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self
    {
        self.clock = clock;
        self
    }

    /// Extra sink, registered after the configured ones
    #[must_use]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self
    {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Create the context and open its sinks
    ///
    /// Sinks are registered console first, then file, then rotating
    /// directory, then extra sinks in the order they were given.
    ///
    /// ## Errors
    ///
    /// Returns the error from opening the configured file or directory.
    pub fn build(self) -> QuillResult<Quill>
    {
        let console = self.config.console;
        let colorize = self.config.colorize_console;
        let file = self.config.file.clone();
        let rotate_dir = self.config.rotate_dir.clone();

        let quill = Quill::empty(self.config, self.clock);
        if let Some(target) = console {
            quill.add_transport(ConsoleSink::new(target).with_colors(colorize));
        }
        if let Some(path) = file {
            quill.save_to_file(path)?;
        }
        if let Some(directory) = rotate_dir {
            quill.save_to_rotating_file(directory)?;
        }
        for sink in self.sinks {
            quill.add_shared_transport(sink);
        }
        Ok(quill)
    }
}

impl Default for QuillBuilder
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl fmt::Debug for QuillBuilder
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("QuillBuilder")
            .field("config", &self.config)
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

/// A named handle for emitting events
///
/// Created from [`Quill::logger`] or [`Logger::get_logger`]. The name chain
/// is fixed at creation; configuration changes on the context apply to
/// every logger immediately.
#[derive(Clone)]
pub struct Logger
{
    quill: Quill,
    names: NameChain,
}

impl Logger
{
    /// Derive a child whose chain is this chain plus `names`
    ///
    /// ```rust
    /// use quill_core::Quill;
    ///
    /// let root = Quill::builder().without_console().build().unwrap().logger();
    /// let stepwise = root.get_logger(["x"]).get_logger(["y"]);
    /// assert_eq!(stepwise.names(), root.get_logger(["x", "y"]).names());
    /// ```
    #[must_use]
    pub fn get_logger<I, S>(&self, names: I) -> Logger
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Logger {
            quill: self.quill.clone(),
            names: self.names.child(names),
        }
    }

    /// The fixed name chain of this logger
    #[must_use]
    pub fn names(&self) -> &NameChain
    {
        &self.names
    }

    /// The context this logger writes through
    #[must_use]
    pub fn quill(&self) -> &Quill
    {
        &self.quill
    }

    /// Log at any level, including custom ones
    pub fn log(&self, level: impl Into<Level>, message: impl fmt::Display)
    {
        let level = level.into();
        if self.quill.is_enabled(&level) {
            self.quill.emit(&LogEvent::new(level, message.to_string(), self.names.clone()));
        }
    }

    /// Log at any level with an attached error trace
    pub fn log_with(&self, level: impl Into<Level>, message: impl fmt::Display, trace: ErrorTrace)
    {
        let level = level.into();
        if self.quill.is_enabled(&level) {
            let event = LogEvent::new(level, message.to_string(), self.names.clone()).with_error(trace);
            self.quill.emit(&event);
        }
    }

    /// Log at `error` level
    pub fn error(&self, message: impl fmt::Display)
    {
        self.log(Level::Error, message);
    }

    /// Log at `error` level with the error's trace merged into the body
    pub fn error_with<E: Error + ?Sized>(&self, message: impl fmt::Display, err: &E)
    {
        self.log_with(Level::Error, message, ErrorTrace::from_error(err));
    }

    /// Log at `warn` level
    pub fn warn(&self, message: impl fmt::Display)
    {
        self.log(Level::Warn, message);
    }

    /// Log at `info` level
    pub fn info(&self, message: impl fmt::Display)
    {
        self.log(Level::Info, message);
    }

    /// Log at `debug` level
    pub fn debug(&self, message: impl fmt::Display)
    {
        self.log(Level::Debug, message);
    }
}

impl fmt::Debug for Logger
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Logger").field("names", &self.names).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests
{
    use chrono::{Local, TimeZone};

    use super::*;
    use crate::sink::MemorySink;
    use crate::timestamp::ManualClock;

    fn capture() -> (Quill, MemorySink)
    {
        let sink = MemorySink::new();
        let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
        let quill = Quill::builder()
            .without_console()
            .clock(Arc::new(clock))
            .sink(sink.clone())
            .build()
            .unwrap();
        (quill, sink)
    }

    #[test]
    fn test_root_logger_line()
    {
        let (quill, sink) = capture();
        quill.logger().info("hello");
        assert_eq!(sink.lines(), vec!["02/29/2024 12:00:00.000 [INFO] hello"]);
    }

    #[test]
    fn test_child_logger_names()
    {
        let (quill, sink) = capture();
        quill.get_logger(["a"]).get_logger(["b"]).warn("nested");
        assert!(sink.contains("[WARN][a][b] nested"));
    }

    #[test]
    fn test_threshold_suppresses_less_severe()
    {
        let (quill, sink) = capture();
        quill.set_level(Level::Warn);
        let log = quill.logger();
        log.debug("no");
        log.info("no");
        log.warn("yes");
        log.error("yes");
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_removed_level_still_renders()
    {
        let (quill, sink) = capture();
        quill.set_levels([("fatal", 0), ("notice", 1)].into_iter().collect());
        quill.set_level("fatal");
        quill.logger().debug("degraded");
        assert_eq!(sink.lines(), vec!["02/29/2024 12:00:00.000 [DEBUG] degraded"]);
    }

    #[test]
    fn test_custom_level()
    {
        let (quill, sink) = capture();
        quill.set_levels(LevelRegistry::default().with("trace", 4));
        quill.set_level("info");
        let log = quill.logger();
        log.log("trace", "filtered");
        quill.set_level("trace");
        log.log("trace", "kept");
        assert_eq!(sink.lines(), vec!["02/29/2024 12:00:00.000 [TRACE] kept"]);
    }

    #[test]
    fn test_error_with_merges_trace()
    {
        let (quill, sink) = capture();
        let err = std::io::Error::other("boom");
        quill.logger().error_with("boom", &err);
        quill.logger().error_with("while saving", &err);
        assert_eq!(
            sink.lines(),
            vec![
                "02/29/2024 12:00:00.000 [ERROR] Error: boom",
                "02/29/2024 12:00:00.000 [ERROR] while saving\nError: boom",
            ]
        );
    }

    #[test]
    fn test_set_colors_applies_to_existing_loggers()
    {
        let sink = MemorySink::new().with_colors(true);
        let quill = Quill::builder().without_console().sink(sink.clone()).build().unwrap();
        let log = quill.get_logger(["svc"]);
        quill.set_colors(ColorMap::empty());
        log.info("plain now");
        assert!(!sink.lines()[0].contains('\x1b'));
    }

    #[test]
    fn test_drop_closes_sinks()
    {
        let (quill, sink) = capture();
        let log = quill.logger();
        drop(quill);
        log.info("still alive");
        assert!(!sink.is_closed());
        drop(log);
        assert!(sink.is_closed());
    }
}
