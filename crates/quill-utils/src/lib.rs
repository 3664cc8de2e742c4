//! # Quill Utilities
//!
//! Shared utilities for Quill.
//!
//! The main piece is diagnostics setup: a `tracing` subscriber for the
//! events `quill-core` emits about its own sinks.

pub mod diagnostics;

// Re-export the setup entry points for convenience
pub use diagnostics::{
    DiagnosticFormat, DiagnosticLevel, DiagnosticsError, init_diagnostics, init_diagnostics_with_level,
};
