//! # Sinks
//!
//! Write targets for rendered lines.
//!
//! A sink receives one complete line per event (without the trailing
//! newline) and performs a best-effort write. Sinks are owned by the
//! [`TransportManager`](crate::TransportManager) from registration until
//! they are removed, at which point [`Sink::close`] runs.
//!
//! ## Built-in sinks
//!
//! | Sink                 | Colors | Backing store                              |
//! |----------------------|--------|--------------------------------------------|
//! | [`ConsoleSink`]      | yes    | stdout or stderr, flushed per line         |
//! | [`FileSink`]         | no     | one file, appended via a background worker |
//! | [`RotatingFileSink`] | no     | `<dir>/<MM-DD-YYYY>.log` + `current.log`   |
//! | [`MemorySink`]       | opt-in | in-memory line buffer                      |

use std::io;

mod console;
mod file;
mod memory;
mod rotating;

pub use console::{ConsoleSink, ConsoleTarget};
pub use file::FileSink;
pub use memory::MemorySink;
pub use rotating::{resolve_pointer, RotatingFileSink, RotatingFileWriter, CURRENT_POINTER_NAME};

/// A destination for rendered log lines
pub trait Sink: Send + Sync
{
    /// Short label used in diagnostics and failure reports
    fn name(&self) -> &str;

    /// Whether this sink receives the colorized render
    fn colorize(&self) -> bool
    {
        false
    }

    /// Write one rendered line; the sink supplies the line terminator
    ///
    /// ## Errors
    ///
    /// Returns the underlying I/O error. The transport manager isolates it,
    /// so a failing sink never affects the caller or other sinks.
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Push buffered lines towards durable storage
    ///
    /// ## Errors
    ///
    /// Returns the underlying I/O error.
    fn flush(&self) -> io::Result<()>
    {
        Ok(())
    }

    /// Release the sink's resources; runs once when it is unregistered
    ///
    /// ## Errors
    ///
    /// Returns the underlying I/O error.
    fn close(&self) -> io::Result<()>
    {
        self.flush()
    }
}

pub(crate) fn closed_error(name: &str) -> io::Error
{
    io::Error::new(io::ErrorKind::BrokenPipe, format!("sink '{name}' is closed"))
}
