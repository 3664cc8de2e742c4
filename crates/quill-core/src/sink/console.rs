//! Console sink

use std::io::{self, Write};
use std::str::FromStr;

use super::Sink;
use crate::error::QuillError;

/// Which standard stream a [`ConsoleSink`] writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget
{
    /// Standard output (default)
    #[default]
    Stdout,
    /// Standard error
    Stderr,
}

impl FromStr for ConsoleTarget
{
    type Err = QuillError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.trim().to_lowercase().as_str() {
            "stdout" | "out" => Ok(ConsoleTarget::Stdout),
            "stderr" | "err" => Ok(ConsoleTarget::Stderr),
            _ => Err(QuillError::InvalidConfig(format!(
                "Unknown console target: {s}. Use 'stdout' or 'stderr'"
            ))),
        }
    }
}

/// Writes colorized lines to stdout or stderr
#[derive(Debug, Clone)]
pub struct ConsoleSink
{
    target: ConsoleTarget,
    colorize: bool,
    name: String,
}

impl ConsoleSink
{
    /// Colorized sink on `target`
    #[must_use]
    pub fn new(target: ConsoleTarget) -> Self
    {
        let name = match target {
            ConsoleTarget::Stdout => "console:stdout",
            ConsoleTarget::Stderr => "console:stderr",
        };
        Self {
            target,
            colorize: true,
            name: name.to_string(),
        }
    }

    /// Colorized sink on stdout
    #[must_use]
    pub fn stdout() -> Self
    {
        Self::new(ConsoleTarget::Stdout)
    }

    /// Colorized sink on stderr
    #[must_use]
    pub fn stderr() -> Self
    {
        Self::new(ConsoleTarget::Stderr)
    }

    /// Turn color codes on or off
    #[must_use]
    pub fn with_colors(mut self, colorize: bool) -> Self
    {
        self.colorize = colorize;
        self
    }

    /// The stream this sink writes to
    #[must_use]
    pub fn target(&self) -> ConsoleTarget
    {
        self.target
    }
}

impl Default for ConsoleSink
{
    fn default() -> Self
    {
        Self::stdout()
    }
}

impl Sink for ConsoleSink
{
    fn name(&self) -> &str
    {
        &self.name
    }

    fn colorize(&self) -> bool
    {
        self.colorize
    }

    fn write_line(&self, line: &str) -> io::Result<()>
    {
        // Holding the stream lock keeps multi-line traces contiguous
        match self.target {
            ConsoleTarget::Stdout => {
                let mut out = io::stdout().lock();
                writeln!(out, "{line}")?;
                out.flush()
            }
            ConsoleTarget::Stderr => {
                let mut out = io::stderr().lock();
                writeln!(out, "{line}")?;
                out.flush()
            }
        }
    }

    fn flush(&self) -> io::Result<()>
    {
        match self.target {
            ConsoleTarget::Stdout => io::stdout().flush(),
            ConsoleTarget::Stderr => io::stderr().flush(),
        }
    }
}
