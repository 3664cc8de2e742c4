//! # quill-core
//!
//! Line formatting and sink composition for the Quill logging facade.
//!
//! This crate turns a log call (level, message, name chain, optional error)
//! into one deterministic line and writes it to every registered sink:
//!
//! ```text
//! 03/07/2024 09:05:02.045 [ERROR][server][db] query failed
//! Error: connection reset
//! ```
//!
//! - [`Level`] / [`LevelRegistry`]: severities ranked by priority
//! - [`ColorMap`] / [`ColorStyle`]: per-level coloring for console sinks
//! - [`NameChain`]: immutable hierarchical logger names
//! - [`Formatter`]: the line layout and error trace merge
//! - [`Sink`] and the built-in console, file and rotating file sinks
//! - [`TransportManager`]: ordered, failure-isolated dispatch
//! - [`Quill`] / [`Logger`]: the facade application code calls
//!
//! Internal diagnostics (sinks opened, rotated, failing) are emitted through
//! `tracing`; install a subscriber (see `quill-utils`) to see them.

#![forbid(unsafe_code)]

#[macro_use]
mod macros;

pub mod color;
pub mod config;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod names;
pub mod sink;
pub mod timestamp;
pub mod transport;

pub use color::{AnsiColor, ColorMap, ColorStyle};
pub use config::QuillConfig;
pub use error::{QuillError, QuillResult};
pub use format::{render_body, ErrorTrace, Formatter, LogEvent};
pub use level::{Level, LevelRegistry};
pub use logger::{GlobalGuard, Logger, Quill, QuillBuilder};
pub use names::NameChain;
pub use sink::{ConsoleSink, ConsoleTarget, FileSink, MemorySink, RotatingFileSink, RotatingFileWriter, Sink};
pub use timestamp::{Clock, ManualClock, SystemClock};
pub use transport::{SinkErrorPolicy, TransportId, TransportManager};
