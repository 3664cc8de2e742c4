//! # Transport Manager
//!
//! The ordered set of registered sinks and the dispatch loop that feeds them.
//!
//! Dispatch renders the plain line once, and the colorized line once if any
//! sink asks for color, then writes to every sink in registration order.
//! Each sink is isolated: a failure is recorded and dispatch moves on to the
//! next sink. What happens to the failure afterwards is decided by the
//! [`SinkErrorPolicy`].

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Local};

use crate::format::{Formatter, LogEvent};
use crate::level::Level;
use crate::names::NameChain;
use crate::sink::Sink;

/// Handle returned when a sink is registered; used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransportId(u64);

impl TransportId
{
    /// Raw numeric id
    #[must_use]
    pub fn raw(self) -> u64
    {
        self.0
    }
}

impl fmt::Display for TransportId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "#{}", self.0)
    }
}

/// What to do when a sink fails to write a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkErrorPolicy
{
    /// Send an `error` line describing the failure to every other sink
    #[default]
    Report,
    /// Drop the failure silently
    Ignore,
}

/// Name chain used for lines describing sink failures
pub const FAILURE_SOURCE: &str = "quill";

#[derive(Clone)]
struct Registered
{
    id: TransportId,
    sink: Arc<dyn Sink>,
}

struct Failure
{
    id: TransportId,
    name: String,
    error: io::Error,
}

/// Registered sinks in insertion order
pub struct TransportManager
{
    sinks: RwLock<Vec<Registered>>,
    next_id: AtomicU64,
}

impl TransportManager
{
    /// Create a manager with no sinks
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            sinks: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `sink` after all existing sinks
    ///
    /// The same sink may be registered more than once; each registration
    /// gets its own id and receives its own copy of every line.
    pub fn add(&self, sink: Arc<dyn Sink>) -> TransportId
    {
        let id = TransportId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, sink = sink.name(), "registered sink");
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registered { id, sink });
        id
    }

    /// Unregister a sink and close it
    ///
    /// Lines already written stay wherever the sink put them. Returns the
    /// sink, or `None` if `id` was not registered.
    pub fn remove(&self, id: TransportId) -> Option<Arc<dyn Sink>>
    {
        let removed = {
            let mut sinks = self.sinks.write().unwrap_or_else(PoisonError::into_inner);
            let index = sinks.iter().position(|entry| entry.id == id)?;
            sinks.remove(index)
        };
        if let Err(error) = removed.sink.close() {
            tracing::warn!(%id, sink = removed.sink.name(), %error, "failed to close sink");
        }
        tracing::debug!(%id, sink = removed.sink.name(), "removed sink");
        Some(removed.sink)
    }

    /// Ids of the registered sinks in dispatch order
    #[must_use]
    pub fn ids(&self) -> Vec<TransportId>
    {
        self.snapshot().iter().map(|entry| entry.id).collect()
    }

    /// Number of registered sinks
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.sinks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no sinks are registered
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Registered>
    {
        self.sinks.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Render `event` and write it to every sink
    ///
    /// Returns the number of sinks that failed.
    pub fn dispatch(
        &self,
        event: &LogEvent,
        formatter: &Formatter<'_>,
        at: &DateTime<Local>,
        policy: SinkErrorPolicy,
    ) -> usize
    {
        // Writes happen outside the lock so a sink may log through the facade
        let sinks = self.snapshot();
        let failures = write_all(&sinks, event, formatter, at, None);
        let failed = failures.len();

        for failure in failures {
            tracing::warn!(
                id = %failure.id,
                sink = %failure.name,
                error = %failure.error,
                "sink failed to write log line"
            );
            match policy {
                SinkErrorPolicy::Report => {
                    let report = LogEvent::new(
                        Level::Error,
                        format!("Log sink '{}' failed: {}", failure.name, failure.error),
                        NameChain::new([FAILURE_SOURCE]),
                    );
                    // Failures while reporting are only traced, never reported again
                    for nested in write_all(&sinks, &report, formatter, at, Some(failure.id)) {
                        tracing::debug!(sink = %nested.name, error = %nested.error, "failed to report sink failure");
                    }
                }
                SinkErrorPolicy::Ignore => {}
            }
        }
        failed
    }

    /// Flush every sink, tracing failures
    pub fn flush(&self)
    {
        for entry in self.snapshot() {
            if let Err(error) = entry.sink.flush() {
                tracing::warn!(id = %entry.id, sink = entry.sink.name(), %error, "failed to flush sink");
            }
        }
    }

    /// Unregister and close every sink
    pub fn shutdown(&self)
    {
        let drained: Vec<Registered> = self
            .sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for entry in drained {
            if let Err(error) = entry.sink.close() {
                tracing::warn!(id = %entry.id, sink = entry.sink.name(), %error, "failed to close sink");
            }
        }
    }
}

fn write_all(
    sinks: &[Registered],
    event: &LogEvent,
    formatter: &Formatter<'_>,
    at: &DateTime<Local>,
    skip: Option<TransportId>,
) -> Vec<Failure>
{
    let plain = Formatter::render_plain(event, at);
    let mut colored: Option<String> = None;
    let mut failures = Vec::new();

    for entry in sinks {
        if Some(entry.id) == skip {
            continue;
        }
        let line = if entry.sink.colorize() {
            colored.get_or_insert_with(|| formatter.paint(&event.level, &plain)).as_str()
        } else {
            plain.as_str()
        };
        if let Err(error) = entry.sink.write_line(line) {
            failures.push(Failure {
                id: entry.id,
                name: entry.sink.name().to_string(),
                error,
            });
        }
    }
    failures
}

impl Default for TransportManager
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl fmt::Debug for TransportManager
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let sinks: Vec<_> = self
            .snapshot()
            .iter()
            .map(|entry| (entry.id, entry.sink.name().to_string()))
            .collect();
        f.debug_struct("TransportManager").field("sinks", &sinks).finish()
    }
}
