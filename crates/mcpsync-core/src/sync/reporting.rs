//! Sync pass reporting
//!
//! Renders per-app outcome tables as plain text. Every pass, including
//! a fully failed one, ends in one of these reports.

use std::fmt::Write;

use super::{DestructiveChange, OverallStatus, SyncReport};

/// Sync report renderer
pub struct SyncReporter;

impl SyncReporter {
    /// Render a full sync report.
    #[must_use]
    pub fn render(report: &SyncReport) -> String {
        let status = report.status();
        let success_count = report
            .sync_results
            .values()
            .filter(|outcome| outcome.success)
            .count();
        let total_count = report.sync_results.len();

        let mut output = String::new();
        output.push_str("\n=== MCP Configuration Sync Report ===\n");
        let _ = writeln!(output, "Source: {}", report.source);
        let _ = writeln!(output, "Status: {} {status}", Self::status_icon(status));
        let _ = writeln!(output, "Apps configured: {success_count}/{total_count}\n");

        let _ = writeln!(
            output,
            "  {:<18} {:<10} {:>8}  {}",
            "App", "Action", "Size", "Validation"
        );

        for (app, outcome) in &report.sync_results {
            let size = outcome
                .size
                .map_or_else(|| "—".to_string(), |size| format!("{size} B"));

            let validation = match report.validation_results.get(app) {
                Some(validation) if validation.in_sync => "✓ in sync".to_string(),
                Some(validation) => {
                    let reason = validation.reason.unwrap_or("unknown");
                    match validation.mismatched_keys.first() {
                        Some(key) => format!("✗ {reason} ({key})"),
                        None => format!("✗ {reason}"),
                    }
                }
                None => "—".to_string(),
            };

            let _ = writeln!(
                output,
                "  {:<18} {:<10} {:>8}  {}",
                app,
                outcome.action.as_str(),
                size,
                validation
            );

            if let Some(error) = &outcome.error {
                let _ = writeln!(output, "  {:<18} {error}", "");
            }
        }

        output
    }

    /// Render the destructive-change table shown before asking for
    /// confirmation.
    #[must_use]
    pub fn render_destructive(changes: &[DestructiveChange]) -> String {
        let mut output = String::new();
        output.push_str("\n⚠ Destructive operation detected\n\n");

        for change in changes {
            let _ = writeln!(output, "  {}", change.app_name);
            let _ = writeln!(output, "    current:   {}", Self::join(&change.existing_servers));
            let _ = writeln!(output, "    removing:  {}", Self::join(&change.lost_servers));
            let _ = writeln!(output, "    remaining: {}", Self::join(&change.remaining_servers));
        }

        output
    }

    const fn status_icon(status: OverallStatus) -> &'static str {
        match status {
            OverallStatus::Success => "✓",
            OverallStatus::PartialSuccess => "⚠",
            OverallStatus::Failed => "✗",
        }
    }

    fn join(names: &[String]) -> String {
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    }
}
