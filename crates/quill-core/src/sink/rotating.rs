//! Date-rotated file sink
//!
//! Every line targets `<dir>/<MM-DD-YYYY>.log` for the local date at the
//! moment it was logged, so output rolls over at local midnight without a
//! timer. The sink reads the clock on the caller's thread and queues the date
//! with the line; the background worker only opens and appends. Whenever the
//! active file changes, `<dir>/current.log` is repointed at it: a relative
//! symlink where the platform allows one, otherwise a small pointer file
//! holding the dated file name. A pointer that cannot be updated is traced
//! and never blocks the dated file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::file::{open_append, Worker};
use super::{closed_error, Sink};
use crate::error::{QuillError, QuillResult};
use crate::timestamp::{format_file_date, Clock, SystemClock};

/// Name of the entry that always resolves to the active dated file
pub const CURRENT_POINTER_NAME: &str = "current.log";

struct ActiveFile
{
    date: String,
    file: File,
}

/// Synchronous date-rotating writer
///
/// This is the writer the [`RotatingFileSink`] runs on its background
/// worker. It is public so it can be driven directly with a
/// [`ManualClock`](crate::ManualClock).
pub struct RotatingFileWriter
{
    directory: PathBuf,
    clock: Arc<dyn Clock>,
    active: Option<ActiveFile>,
}

impl RotatingFileWriter
{
    /// Writer over `directory` using the wall clock
    ///
    /// ## Errors
    ///
    /// Returns [`QuillError::CreateDirectory`] if `directory` cannot be created.
    pub fn new(directory: impl AsRef<Path>) -> QuillResult<Self>
    {
        Self::with_clock(directory, Arc::new(SystemClock))
    }

    /// Writer over `directory` reading dates from `clock`
    ///
    /// ## Errors
    ///
    /// Returns [`QuillError::CreateDirectory`] if `directory` cannot be created.
    pub fn with_clock(directory: impl AsRef<Path>, clock: Arc<dyn Clock>) -> QuillResult<Self>
    {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory).map_err(|source| QuillError::CreateDirectory {
            path: directory.clone(),
            source,
        })?;
        Ok(Self {
            directory,
            clock,
            active: None,
        })
    }

    /// Path of the dated file for `date` (`MM-DD-YYYY`)
    #[must_use]
    pub fn dated_path(&self, date: &str) -> PathBuf
    {
        self.directory.join(format!("{date}.log"))
    }

    /// Path of the `current.log` pointer
    #[must_use]
    pub fn pointer_path(&self) -> PathBuf
    {
        self.directory.join(CURRENT_POINTER_NAME)
    }

    /// The file the last write went to
    #[must_use]
    pub fn active_path(&self) -> Option<PathBuf>
    {
        self.active.as_ref().map(|active| self.dated_path(&active.date))
    }

    /// Append `buf` to the file for `date` (`MM-DD-YYYY`), rolling over if
    /// the active file belongs to another date
    ///
    /// ## Errors
    ///
    /// Returns the I/O error from opening or writing the dated file. A
    /// `current.log` that cannot be updated is only traced.
    pub fn write_dated(&mut self, date: &str, buf: &[u8]) -> io::Result<()>
    {
        let file = self.roll(date)?;
        file.write_all(buf)
    }

    /// Make sure the file for `date` is the active one
    fn roll(&mut self, date: &str) -> io::Result<&mut File>
    {
        let stale = match &self.active {
            Some(active) => active.date != date,
            None => true,
        };
        if stale {
            let path = self.dated_path(date);
            let file = open_append(&path).map_err(QuillError::into_io)?;
            if let Some(mut previous) = self.active.replace(ActiveFile {
                date: date.to_string(),
                file,
            }) {
                if let Err(error) = previous.file.flush() {
                    tracing::warn!(date = %previous.date, %error, "failed to flush previous log file");
                }
            }
            if let Err(error) = self.update_pointer(&path) {
                tracing::warn!(pointer = %self.pointer_path().display(), %error, "failed to update current log pointer");
            }
            tracing::debug!(path = %path.display(), "rotated log file");
        }
        match self.active.as_mut() {
            Some(active) => Ok(&mut active.file),
            None => Err(io::Error::other("no active log file")),
        }
    }

    /// Repoint `current.log` at `target`
    fn update_pointer(&self, target: &Path) -> io::Result<()>
    {
        let pointer = self.pointer_path();
        if pointer.exists() || pointer.is_symlink() {
            fs::remove_file(&pointer)?;
        }

        // Both files live in the same directory, so the bare file name works
        // as a relative link target
        let relative = target.file_name().map(PathBuf::from).unwrap_or_else(|| target.to_path_buf());

        if link(&relative, &pointer).is_err() {
            fs::write(&pointer, relative.to_string_lossy().as_bytes())?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn link(target: &Path, pointer: &Path) -> io::Result<()>
{
    std::os::unix::fs::symlink(target, pointer)
}

#[cfg(windows)]
fn link(target: &Path, pointer: &Path) -> io::Result<()>
{
    std::os::windows::fs::symlink_file(target, pointer)
}

#[cfg(not(any(unix, windows)))]
fn link(_target: &Path, _pointer: &Path) -> io::Result<()>
{
    Err(io::Error::new(io::ErrorKind::Unsupported, "symlinks are not supported"))
}

/// Resolve a `current.log` pointer to the dated file it designates
///
/// Follows the symlink when there is one and reads the pointer file
/// otherwise.
///
/// ## Errors
///
/// Returns the I/O error from reading the link or pointer file.
pub fn resolve_pointer(pointer: &Path) -> io::Result<PathBuf>
{
    let directory = pointer.parent().unwrap_or_else(|| Path::new("."));
    let target = if pointer.is_symlink() {
        fs::read_link(pointer)?
    } else {
        PathBuf::from(fs::read_to_string(pointer)?.trim())
    };
    Ok(directory.join(target))
}

impl Write for RotatingFileWriter
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>
    {
        let date = format_file_date(&self.clock.now());
        self.write_dated(&date, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()>
    {
        match self.active.as_mut() {
            Some(active) => active.file.flush(),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for RotatingFileWriter
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("RotatingFileWriter")
            .field("directory", &self.directory)
            .field("active", &self.active.as_ref().map(|a| &a.date))
            .finish_non_exhaustive()
    }
}

/// Separates the date from the line in a queued message
const DATE_SEPARATOR: u8 = 0;

/// Worker-side writer for messages shaped `<date>\0<line>`
///
/// The date is taken when the line is logged, so a line queued just before
/// midnight still lands in that day's file.
struct DatedMessages(RotatingFileWriter);

impl Write for DatedMessages
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>
    {
        match buf.iter().position(|b| *b == DATE_SEPARATOR) {
            Some(split) => {
                let date = String::from_utf8_lossy(&buf[..split]);
                self.0.write_dated(&date, &buf[split + 1..])?;
            }
            None => self.0.write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()>
    {
        self.0.flush()
    }
}

/// Appends uncolored lines to a file named after the local date at log time
pub struct RotatingFileSink
{
    directory: PathBuf,
    name: String,
    clock: Arc<dyn Clock>,
    worker: Mutex<Option<Worker>>,
}

impl RotatingFileSink
{
    /// Rotate files inside `directory` using the wall clock
    ///
    /// ## Errors
    ///
    /// Returns [`QuillError::CreateDirectory`] if `directory` cannot be created.
    pub fn new(directory: impl AsRef<Path>) -> QuillResult<Self>
    {
        Self::with_clock(directory, Arc::new(SystemClock))
    }

    /// Rotate files inside `directory` reading dates from `clock`
    ///
    /// ## Errors
    ///
    /// Returns [`QuillError::CreateDirectory`] if `directory` cannot be created.
    pub fn with_clock(directory: impl AsRef<Path>, clock: Arc<dyn Clock>) -> QuillResult<Self>
    {
        let writer = RotatingFileWriter::with_clock(directory, clock.clone())?;
        let directory = writer.directory.clone();
        tracing::debug!(directory = %directory.display(), "opened rotating file sink");
        Ok(Self {
            name: format!("rotating:{}", directory.display()),
            clock,
            worker: Mutex::new(Some(Worker::spawn(DatedMessages(writer), "quill-rotate"))),
            directory,
        })
    }

    /// Directory holding the dated files
    #[must_use]
    pub fn directory(&self) -> &Path
    {
        &self.directory
    }

    /// Path of the `current.log` pointer
    #[must_use]
    pub fn pointer_path(&self) -> PathBuf
    {
        self.directory.join(CURRENT_POINTER_NAME)
    }
}

impl std::fmt::Debug for RotatingFileSink
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("RotatingFileSink")
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

impl Sink for RotatingFileSink
{
    fn name(&self) -> &str
    {
        &self.name
    }

    fn write_line(&self, line: &str) -> io::Result<()>
    {
        let date = format_file_date(&self.clock.now());
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        match worker.as_mut() {
            Some(worker) => worker.send_tagged(&date, DATE_SEPARATOR, line),
            None => Err(closed_error(&self.name)),
        }
    }

    fn close(&self) -> io::Result<()>
    {
        let worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner).take();
        drop(worker);
        tracing::debug!(directory = %self.directory.display(), "closed rotating file sink");
        Ok(())
    }
}
