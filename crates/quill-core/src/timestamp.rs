//! # Timestamps
//!
//! Local-time rendering for line prefixes and rotating file names, plus the
//! [`Clock`] seam that lets tests pin "now".

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Local};

/// Line prefix: `MM/DD/YYYY HH:MM:SS.mmm`
pub const LINE_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S%.3f";

/// Rotating file stem: `MM-DD-YYYY`
pub const FILE_DATE_FORMAT: &str = "%m-%d-%Y";

/// Source of the current instant
pub trait Clock: Send + Sync
{
    /// The current local time
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock backed by `chrono::Local::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock
{
    fn now(&self) -> DateTime<Local>
    {
        Local::now()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same instant, so a test can keep one handle and hand
/// another to a writer.
#[derive(Clone)]
pub struct ManualClock
{
    now: Arc<Mutex<DateTime<Local>>>,
}

impl ManualClock
{
    /// Create a clock frozen at `now`
    #[must_use]
    pub fn new(now: DateTime<Local>) -> Self
    {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Jump to `now`
    pub fn set(&self, now: DateTime<Local>)
    {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move forward by `by`
    pub fn advance(&self, by: Duration)
    {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock
{
    fn now(&self) -> DateTime<Local>
    {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ManualClock
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("ManualClock").field("now", &self.now()).finish()
    }
}

/// Render `at` as a line timestamp
#[must_use]
pub fn format_timestamp(at: &DateTime<Local>) -> String
{
    at.format(LINE_TIMESTAMP_FORMAT).to_string()
}

/// Render the date of `at` as a rotating file stem
#[must_use]
pub fn format_file_date(at: &DateTime<Local>) -> String
{
    at.format(FILE_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests
{
    use chrono::TimeZone;

    use super::*;

    fn fixed() -> DateTime<Local>
    {
        Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap() + Duration::milliseconds(45)
    }

    #[test]
    fn test_line_timestamp_is_zero_padded()
    {
        assert_eq!(format_timestamp(&fixed()), "03/07/2024 09:05:02.045");
    }

    #[test]
    fn test_file_date()
    {
        assert_eq!(format_file_date(&fixed()), "03-07-2024");
    }

    #[test]
    fn test_manual_clock_advances()
    {
        let clock = ManualClock::new(fixed());
        let shared = clock.clone();
        clock.advance(Duration::days(1));
        assert_eq!(format_file_date(&shared.now()), "03-08-2024");
    }
}
