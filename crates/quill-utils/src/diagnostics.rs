//! # Diagnostics
//!
//! Subscriber setup for Quill's own `tracing` events.
//!
//! `quill-core` reports its lifecycle (sinks registered, files rotated,
//! sinks failing) through `tracing`. Nothing is printed unless a subscriber
//! is installed; this module installs one that writes to stderr so it never
//! interleaves with console sink output on stdout.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quill_utils::init_diagnostics;
//!
//! // Reads RUST_LOG and QUILL_DIAG_FORMAT
//! init_diagnostics().expect("Failed to initialize diagnostics");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: filter directives (e.g. `RUST_LOG=quill_core=debug`), default `warn`
//! - `QUILL_DIAG_FORMAT`: `pretty` or `compact` (default: `compact`)

use std::env;
use std::io;
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Timestamp layout shared with rendered log lines
const DIAGNOSTIC_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S%.3f";

/// Diagnostic output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticFormat
{
    /// Multi-line, human-readable output with source locations
    Pretty,
    /// One line per event (default)
    #[default]
    Compact,
}

impl FromStr for DiagnosticFormat
{
    type Err = DiagnosticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(DiagnosticFormat::Pretty),
            "compact" | "short" => Ok(DiagnosticFormat::Compact),
            _ => Err(DiagnosticsError::InvalidFormat(format!(
                "{s}. Use 'pretty' or 'compact'"
            ))),
        }
    }
}

/// Diagnostic verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel
{
    /// Error level
    Error,
    /// Warning level (default)
    Warn,
    /// Info level
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<DiagnosticLevel> for Level
{
    fn from(level: DiagnosticLevel) -> Self
    {
        match level {
            DiagnosticLevel::Error => Level::ERROR,
            DiagnosticLevel::Warn => Level::WARN,
            DiagnosticLevel::Info => Level::INFO,
            DiagnosticLevel::Debug => Level::DEBUG,
            DiagnosticLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for DiagnosticLevel
{
    type Err = DiagnosticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(DiagnosticLevel::Error),
            "warn" | "warning" => Ok(DiagnosticLevel::Warn),
            "info" => Ok(DiagnosticLevel::Info),
            "debug" | "dbg" => Ok(DiagnosticLevel::Debug),
            "trace" => Ok(DiagnosticLevel::Trace),
            _ => Err(DiagnosticsError::InvalidLevel(format!(
                "{s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            ))),
        }
    }
}

/// Install the diagnostics subscriber using environment settings
///
/// `RUST_LOG` may hold full filter directives; when it is unset or invalid
/// the filter falls back to `warn`.
///
/// ## Errors
///
/// Returns [`DiagnosticsError::InitializationFailed`] if a global subscriber
/// is already installed, and [`DiagnosticsError::InvalidFormat`] if
/// `QUILL_DIAG_FORMAT` is set to an unknown format.
pub fn init_diagnostics() -> Result<(), DiagnosticsError>
{
    let format = match env::var("QUILL_DIAG_FORMAT") {
        Ok(value) => value.parse()?,
        Err(_) => DiagnosticFormat::default(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()));
    install(format, filter)
}

/// Install the diagnostics subscriber with an explicit level and format
///
/// ## Example
///
/// ```rust,no_run
/// use quill_utils::{DiagnosticFormat, DiagnosticLevel, init_diagnostics_with_level};
///
/// init_diagnostics_with_level(DiagnosticLevel::Debug, DiagnosticFormat::Pretty)
///     .expect("Failed to initialize diagnostics");
/// ```
///
/// ## Errors
///
/// Returns [`DiagnosticsError::InitializationFailed`] if a global subscriber
/// is already installed.
pub fn init_diagnostics_with_level(level: DiagnosticLevel, format: DiagnosticFormat) -> Result<(), DiagnosticsError>
{
    install(format, EnvFilter::new(Level::from(level).to_string()))
}

fn install(format: DiagnosticFormat, filter: EnvFilter) -> Result<(), DiagnosticsError>
{
    let timer = ChronoLocal::new(DIAGNOSTIC_TIME_FORMAT.to_string());

    let layer = match format {
        DiagnosticFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(timer)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
        DiagnosticFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_timer(timer)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
    };

    Registry::default()
        .with(layer)
        .try_init()
        .map_err(|e| DiagnosticsError::InitializationFailed(e.to_string()))
}

/// Diagnostics initialization error
#[derive(Debug, thiserror::Error)]
pub enum DiagnosticsError
{
    /// Invalid diagnostic format
    #[error("Invalid diagnostic format: {0}")]
    InvalidFormat(String),

    /// Invalid diagnostic level
    #[error("Invalid diagnostic level: {0}")]
    InvalidLevel(String),

    /// Failed to install the subscriber
    #[error("Failed to initialize diagnostics: {0}")]
    InitializationFailed(String),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_diagnostic_format_from_str()
    {
        assert_eq!(DiagnosticFormat::from_str("pretty").unwrap(), DiagnosticFormat::Pretty);
        assert_eq!(DiagnosticFormat::from_str("compact").unwrap(), DiagnosticFormat::Compact);
        assert_eq!(DiagnosticFormat::from_str("dev").unwrap(), DiagnosticFormat::Pretty);
        assert!(DiagnosticFormat::from_str("json").is_err());
    }

    #[test]
    fn test_diagnostic_level_from_str()
    {
        assert_eq!(DiagnosticLevel::from_str("error").unwrap(), DiagnosticLevel::Error);
        assert_eq!(DiagnosticLevel::from_str("warning").unwrap(), DiagnosticLevel::Warn);
        assert_eq!(DiagnosticLevel::from_str("info").unwrap(), DiagnosticLevel::Info);
        assert_eq!(DiagnosticLevel::from_str("dbg").unwrap(), DiagnosticLevel::Debug);
        assert_eq!(DiagnosticLevel::from_str("trace").unwrap(), DiagnosticLevel::Trace);
        assert!(DiagnosticLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_diagnostic_level_to_tracing_level()
    {
        assert_eq!(Level::from(DiagnosticLevel::Error), Level::ERROR);
        assert_eq!(Level::from(DiagnosticLevel::Warn), Level::WARN);
        assert_eq!(Level::from(DiagnosticLevel::Info), Level::INFO);
        assert_eq!(Level::from(DiagnosticLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(DiagnosticLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_error_messages()
    {
        let err = DiagnosticLevel::from_str("loud").unwrap_err();
        assert!(err.to_string().starts_with("Invalid diagnostic level: loud"));
    }

    #[test]
    fn test_second_install_fails()
    {
        // The first call may or may not win depending on test order
        let _ = init_diagnostics_with_level(DiagnosticLevel::Error, DiagnosticFormat::Compact);
        let second = init_diagnostics_with_level(DiagnosticLevel::Error, DiagnosticFormat::Compact);
        assert!(matches!(second, Err(DiagnosticsError::InitializationFailed(_))));
    }
}
