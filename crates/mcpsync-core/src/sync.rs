//! The merge/validate/report synchronization pipeline
//!
//! One pass: a source document is normalized into the canonical config,
//! written out through every target's own dialect adapter, then every
//! target is re-read and compared against canonical to produce a
//! validation report.

mod orchestrator;
mod reporting;

pub use orchestrator::{ConfirmCallback, Synchronizer};
pub use reporting::SyncReporter;

use std::collections::BTreeMap;
use std::fmt;

/// What happened to one target during a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Config file written for the first time
    Created,
    /// Existing config file rewritten
    Updated,
    /// Target left untouched (e.g. unparsable existing file)
    Skipped,
    /// Write attempted and failed
    Failed,
    /// Whole pass cancelled before any write
    Cancelled,
}

impl SyncAction {
    /// Lowercase label used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Per-app outcome of one sync pass.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Whether the target was written successfully.
    pub success: bool,
    /// What was done to the target.
    pub action: SyncAction,
    /// Failure detail, when `success` is false.
    pub error: Option<String>,
    /// Size of the written file in bytes.
    pub size: Option<u64>,
    /// Dialect the target was written in.
    pub format: &'static str,
}

/// Per-app outcome of validation.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// Whether the target's extracted config matches the reference.
    pub in_sync: bool,
    /// Why the target is out of sync (`missing`, `parse_error`,
    /// `mismatch`, `format_mismatch_skip`).
    pub reason: Option<&'static str>,
    /// Key paths that differ, when the reason is `mismatch`.
    pub mismatched_keys: Vec<String>,
    /// Dialect detected on disk.
    pub format: Option<&'static str>,
}

/// A sync that would drop server entries an application currently has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestructiveChange {
    /// Affected application.
    pub app_name: String,
    /// Server names currently in the app's file.
    pub existing_servers: Vec<String>,
    /// Server names the sync would remove.
    pub lost_servers: Vec<String>,
    /// Server names that would remain afterwards.
    pub remaining_servers: Vec<String>,
}

/// Overall status of a completed sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    /// Every target written and validated in sync
    Success,
    /// Every target written, but some validation mismatched
    PartialSuccess,
    /// At least one write failed or was cancelled
    Failed,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "SUCCESS",
            Self::PartialSuccess => "PARTIAL_SUCCESS",
            Self::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

/// Everything one `sync_from_source` pass produced.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Label of the source the canonical config was taken from.
    pub source: String,
    /// Per-app write outcomes.
    pub sync_results: BTreeMap<String, SyncOutcome>,
    /// Per-app validation outcomes.
    pub validation_results: BTreeMap<String, ValidationOutcome>,
}

impl SyncReport {
    /// Derive the overall status from the per-app outcomes.
    #[must_use]
    pub fn status(&self) -> OverallStatus {
        let all_success = self.sync_results.values().all(|outcome| outcome.success);
        let all_in_sync = self
            .validation_results
            .values()
            .all(|outcome| outcome.in_sync);

        if all_success && all_in_sync {
            OverallStatus::Success
        } else if all_success {
            OverallStatus::PartialSuccess
        } else {
            OverallStatus::Failed
        }
    }

    /// Whether the pass was fully successful.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status() == OverallStatus::Success
    }
}
