//! Formatting macros
//!
//! Each macro substitutes its arguments with `format_args!` and hands the
//! result to the matching [`Logger`](crate::Logger) method:
//!
//! ```rust
//! use quill_core::{MemorySink, Quill};
//!
//! let capture = MemorySink::new();
//! let quill = Quill::builder().without_console().sink(capture.clone()).build().unwrap();
//! let log = quill.get_logger(["jobs"]);
//!
//! quill_core::info!(log, "processed {} of {}", 3, 10);
//! quill_core::log!(log, "audit", "user {} signed in", "ada");
//!
//! assert!(capture.contains("[INFO][jobs] processed 3 of 10"));
//! assert!(capture.contains("[AUDIT][jobs] user ada signed in"));
//! ```

/// Log at any level with `format!`-style arguments
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, ::std::format_args!($($arg)+))
    };
}

/// Log at `error` level with `format!`-style arguments
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format_args!($($arg)+))
    };
}

/// Log at `warn` level with `format!`-style arguments
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(::std::format_args!($($arg)+))
    };
}

/// Log at `info` level with `format!`-style arguments
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format_args!($($arg)+))
    };
}

/// Log at `debug` level with `format!`-style arguments
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(::std::format_args!($($arg)+))
    };
}
