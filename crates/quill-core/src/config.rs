//! # Configuration
//!
//! Everything a [`Quill`](crate::Quill) context is built from.
//!
//! ## Environment Variables
//!
//! [`QuillConfig::from_env`] reads the following (all optional):
//!
//! - `QUILL_LEVEL`: threshold level name (default: `debug`)
//! - `QUILL_LOG_FILE`: append every line to this file
//! - `QUILL_LOG_DIR`: append every line to a date-rotated file in this directory
//! - `QUILL_NO_COLOR`: disable console colors when set, even to an empty value
//! - `NO_COLOR`: disable console colors when set to a non-empty value
//! - `QUILL_CONSOLE`: `stdout` (default), `stderr`, or `none`

use std::env;
use std::path::PathBuf;

use crate::color::ColorMap;
use crate::error::QuillResult;
use crate::level::{Level, LevelRegistry};
use crate::sink::ConsoleTarget;
use crate::transport::SinkErrorPolicy;

/// Threshold level
pub const ENV_LEVEL: &str = "QUILL_LEVEL";
/// Single log file path
pub const ENV_LOG_FILE: &str = "QUILL_LOG_FILE";
/// Rotating log directory
pub const ENV_LOG_DIR: &str = "QUILL_LOG_DIR";
/// Disable console colors
pub const ENV_NO_COLOR: &str = "QUILL_NO_COLOR";
/// Cross-tool convention for disabling colors, honored when non-empty
pub const ENV_STANDARD_NO_COLOR: &str = "NO_COLOR";
/// Console target
pub const ENV_CONSOLE: &str = "QUILL_CONSOLE";

/// Settings for a logging context
#[derive(Debug, Clone)]
pub struct QuillConfig
{
    /// Level priorities
    pub levels: LevelRegistry,
    /// Console color strategies
    pub colors: ColorMap,
    /// Least severe level that is still emitted
    pub threshold: Level,
    /// Console stream, or `None` for no console sink
    pub console: Option<ConsoleTarget>,
    /// Whether the console sink receives colorized lines
    pub colorize_console: bool,
    /// Single file to append to
    pub file: Option<PathBuf>,
    /// Directory for date-rotated files
    pub rotate_dir: Option<PathBuf>,
    /// What to do when a sink fails
    pub sink_error_policy: SinkErrorPolicy,
}

impl Default for QuillConfig
{
    fn default() -> Self
    {
        Self {
            levels: LevelRegistry::default(),
            colors: ColorMap::default(),
            threshold: Level::Debug,
            console: Some(ConsoleTarget::Stdout),
            colorize_console: true,
            file: None,
            rotate_dir: None,
            sink_error_policy: SinkErrorPolicy::Report,
        }
    }
}

impl QuillConfig
{
    /// Defaults overridden by the process environment
    ///
    /// ## Errors
    ///
    /// Returns [`QuillError::InvalidConfig`](crate::QuillError::InvalidConfig)
    /// if `QUILL_CONSOLE` names an unknown stream.
    pub fn from_env() -> QuillResult<Self>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`
    ///
    /// Empty values are treated as unset, except for `QUILL_NO_COLOR` where
    /// presence alone counts.
    ///
    /// ```rust
    /// use quill_core::{Level, QuillConfig};
    ///
    /// let config = QuillConfig::from_lookup(|key| (key == "QUILL_LEVEL").then(|| "warn".to_string())).unwrap();
    /// assert_eq!(config.threshold, Level::Warn);
    /// ```
    ///
    /// ## Errors
    ///
    /// Returns [`QuillError::InvalidConfig`](crate::QuillError::InvalidConfig)
    /// if `QUILL_CONSOLE` names an unknown stream.
    pub fn from_lookup<F>(lookup: F) -> QuillResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(level) = value(ENV_LEVEL) {
            config.threshold = Level::from(level);
        }
        config.file = value(ENV_LOG_FILE).map(PathBuf::from);
        config.rotate_dir = value(ENV_LOG_DIR).map(PathBuf::from);
        if lookup(ENV_NO_COLOR).is_some() || value(ENV_STANDARD_NO_COLOR).is_some() {
            config.colorize_console = false;
        }
        if let Some(console) = value(ENV_CONSOLE) {
            config.console = if console.trim().eq_ignore_ascii_case("none") {
                None
            } else {
                Some(console.parse()?)
            };
        }

        Ok(config)
    }
}
