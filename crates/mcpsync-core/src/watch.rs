//! Debounced file watching for automatic re-synchronization
//!
//! The daemon subscribes one non-recursive directory watch per distinct
//! config-file parent (the file itself may not exist yet) and routes
//! modification events through a per-app debouncer, so rapid successive
//! edits coalesce into a single sync and echoes of our own writes are
//! discarded.

mod daemon;
mod debouncer;

pub use daemon::SyncDaemon;
pub use debouncer::{ChangeDebouncer, DebounceAction};

use thiserror::Error;

/// Errors from the watch subsystem.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Underlying filesystem watcher failure.
    #[error("filesystem watch error: {0}")]
    Notify(#[from] notify::Error),

    /// Watch directories could not be prepared.
    #[error("failed to prepare watch directories")]
    Setup(#[source] anyhow::Error),

    /// The daemon has no applications to watch.
    #[error("no applications to watch")]
    NoTargets,
}
