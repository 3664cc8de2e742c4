//! Single-file sink
//!
//! Lines are handed to a `tracing_appender` worker thread so a slow disk
//! never stalls the caller. Closing the sink drops the worker guard, which
//! drains the queue before returning.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};

use super::{closed_error, Sink};
use crate::error::{QuillError, QuillResult};

/// Background writer plus the guard that keeps its worker alive
pub(crate) struct Worker
{
    writer: NonBlocking,
    _guard: WorkerGuard,
}

impl Worker
{
    pub(crate) fn spawn<W: Write + Send + 'static>(inner: W, thread_name: &str) -> Self
    {
        let (writer, guard) = NonBlockingBuilder::default()
            .thread_name(thread_name)
            .finish(inner);
        Self { writer, _guard: guard }
    }

    pub(crate) fn send(&mut self, line: &str) -> io::Result<()>
    {
        // One write call per line keeps each line a single queued message
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        self.writer.write_all(buf.as_bytes())
    }

    /// Queue `<tag><separator><line>\n` as a single message
    pub(crate) fn send_tagged(&mut self, tag: &str, separator: u8, line: &str) -> io::Result<()>
    {
        let mut buf = Vec::with_capacity(tag.len() + line.len() + 2);
        buf.extend_from_slice(tag.as_bytes());
        buf.push(separator);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
        self.writer.write_all(&buf)
    }
}

/// Open `path` for appending, creating it and its parent directories
pub(crate) fn open_append(path: &Path) -> QuillResult<File>
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| QuillError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| QuillError::OpenSink {
            path: path.to_path_buf(),
            source,
        })
}

/// Appends uncolored lines to one fixed file
pub struct FileSink
{
    path: PathBuf,
    name: String,
    worker: Mutex<Option<Worker>>,
}

impl FileSink
{
    /// Open (or create) `path` and start the background writer
    ///
    /// ## Errors
    ///
    /// Returns [`QuillError::CreateDirectory`] if the parent directory cannot
    /// be created and [`QuillError::OpenSink`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> QuillResult<Self>
    {
        let path = path.as_ref().to_path_buf();
        let file = open_append(&path)?;
        tracing::debug!(path = %path.display(), "opened file sink");
        Ok(Self {
            name: format!("file:{}", path.display()),
            worker: Mutex::new(Some(Worker::spawn(file, "quill-file"))),
            path,
        })
    }

    /// The file this sink appends to
    #[must_use]
    pub fn path(&self) -> &Path
    {
        &self.path
    }
}

impl std::fmt::Debug for FileSink
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("FileSink").field("path", &self.path).finish_non_exhaustive()
    }
}

impl Sink for FileSink
{
    fn name(&self) -> &str
    {
        &self.name
    }

    fn write_line(&self, line: &str) -> io::Result<()>
    {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        match worker.as_mut() {
            Some(worker) => worker.send(line),
            None => Err(closed_error(&self.name)),
        }
    }

    fn close(&self) -> io::Result<()>
    {
        // Dropping the guard blocks until the worker has drained its queue
        let worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner).take();
        drop(worker);
        tracing::debug!(path = %self.path.display(), "closed file sink");
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_file_sink_appends_lines()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "existing\n").unwrap();

        let sink = FileSink::open(&path).unwrap();
        sink.write_line("first").unwrap();
        sink.write_line("second").unwrap();
        sink.close().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "existing\nfirst\nsecond\n");
    }

    #[test]
    fn test_file_sink_creates_parent_directories()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("app.log");
        let sink = FileSink::open(&path).unwrap();
        sink.close().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_after_close_fails()
    {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::open(dir.path().join("app.log")).unwrap();
        sink.close().unwrap();
        assert!(sink.write_line("late").is_err());
    }

    #[test]
    fn test_open_failure_is_reported()
    {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a log file
        let err = FileSink::open(dir.path()).unwrap_err();
        assert!(matches!(err, QuillError::OpenSink { .. }));
        assert!(err.to_string().contains("Failed to open log file"));
    }

    #[test]
    fn test_file_sink_never_colors()
    {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::open(dir.path().join("app.log")).unwrap();
        assert!(!sink.colorize());
    }
}
