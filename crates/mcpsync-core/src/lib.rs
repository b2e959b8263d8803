//! # mcpsync-core
//!
//! Core library for the MCP Configuration Synchronization Tool.
//!
//! Keeps Model Context Protocol server definitions consistent across
//! desktop applications that each persist them in a different on-disk
//! JSON dialect: dialect detection and lossless merging, the
//! load→merge→write→validate pipeline, and a debounced file-watch
//! daemon that re-synchronizes on external edits.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Core error types for the mcpsync library
pub mod error {
    /// Result type alias using `anyhow::Error`
    pub type Result<T> = anyhow::Result<T>;
}

/// Known applications and install-state discovery
pub mod apps;

/// Whole-document JSON I/O with atomic replacement
pub mod document;

/// MCP configuration dialects: detection, extraction, merging
pub mod format;

/// Tool settings loaded from the global config file
pub mod settings;

/// The merge/validate/report synchronization pipeline
pub mod sync;

/// Debounced file watching for automatic re-synchronization
pub mod watch;
