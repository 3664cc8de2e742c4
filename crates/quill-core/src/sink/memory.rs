//! In-memory sink for tests and embedding

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{closed_error, Sink};

/// Captures rendered lines in memory
///
/// Clones share the same buffer, so one handle can be registered while
/// another is kept for assertions.
///
/// ```rust
/// use quill_core::{MemorySink, Quill};
///
/// let quill = Quill::builder().without_console().build().unwrap();
/// let capture = MemorySink::new();
/// quill.add_transport(capture.clone());
///
/// quill.logger().get_logger(["db"]).info("connected");
/// assert!(capture.contains("[INFO][db] connected"));
/// ```
#[derive(Debug, Clone)]
pub struct MemorySink
{
    lines: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
    colorize: bool,
}

impl MemorySink
{
    /// Create an uncolored capture sink
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            lines: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
            colorize: false,
        }
    }

    /// Receive the colorized render instead of the plain one
    #[must_use]
    pub fn with_colors(mut self, colorize: bool) -> Self
    {
        self.colorize = colorize;
        self
    }

    /// All captured lines in write order
    #[must_use]
    pub fn lines(&self) -> Vec<String>
    {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Captured lines joined with newlines, as a file would contain them
    #[must_use]
    pub fn contents(&self) -> String
    {
        let lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out = String::new();
        for line in lines.iter() {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Whether any captured line contains `text`
    #[must_use]
    pub fn contains(&self, text: &str) -> bool
    {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|line| line.contains(text))
    }

    /// Number of captured lines
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been captured
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    /// Drop everything captured so far
    pub fn clear(&self)
    {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Whether [`Sink::close`] has run
    #[must_use]
    pub fn is_closed(&self) -> bool
    {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for MemorySink
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl Sink for MemorySink
{
    fn name(&self) -> &str
    {
        "memory"
    }

    fn colorize(&self) -> bool
    {
        self.colorize
    }

    fn write_line(&self, line: &str) -> io::Result<()>
    {
        if self.is_closed() {
            return Err(closed_error(self.name()));
        }
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }

    fn close(&self) -> io::Result<()>
    {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
