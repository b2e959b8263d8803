//! Sync orchestration - owns the canonical config and drives
//! load→merge→write→validate across all targets

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value, json};
use tracing::{debug, error, info, warn};

use super::{DestructiveChange, SyncAction, SyncOutcome, SyncReport, ValidationOutcome};
use crate::apps::AppTarget;
use crate::document::{self, LoadedDoc};
use crate::error::Result;
use crate::format::{self, FormatKind};

/// Callback consulted before a destructive sync proceeds. Returns true
/// to proceed. The callback owns interrupt handling; an interrupted or
/// failed prompt counts as "abort".
pub type ConfirmCallback = Box<dyn FnMut(&[DestructiveChange]) -> Result<bool> + Send>;

/// Owns the canonical MCP config for a run and synchronizes it across
/// an immutable set of application targets.
pub struct Synchronizer {
    canonical: Value,
    targets: Vec<AppTarget>,
    confirm: Option<ConfirmCallback>,
    last_written: HashMap<String, [u8; 32]>,
}

impl Synchronizer {
    /// Create a synchronizer over the given targets. The canonical
    /// config starts empty.
    #[must_use]
    pub fn new(targets: Vec<AppTarget>) -> Self {
        Self {
            canonical: json!({ "servers": {} }),
            targets,
            confirm: None,
            last_written: HashMap::new(),
        }
    }

    /// Attach a destructive-change confirmation callback. Without one,
    /// unforced destructive syncs are declined.
    #[must_use]
    pub fn with_confirmation(mut self, confirm: ConfirmCallback) -> Self {
        self.confirm = Some(confirm);
        self
    }

    /// The targets this synchronizer writes to.
    #[must_use]
    pub fn targets(&self) -> &[AppTarget] {
        &self.targets
    }

    /// The current canonical config.
    #[must_use]
    pub fn canonical(&self) -> &Value {
        &self.canonical
    }

    /// Look up a target by application name.
    #[must_use]
    pub fn target_named(&self, name: &str) -> Option<&AppTarget> {
        self.targets.iter().find(|target| target.name == name)
    }

    /// Whether the file's current content matches the bytes this
    /// synchronizer last wrote for `app`. Used by the watch loop to
    /// recognize echoes of its own writes.
    #[must_use]
    pub fn matches_last_write(&self, app: &str, path: &Path) -> bool {
        match (self.last_written.get(app), document::digest_file(path)) {
            (Some(written), Some(current)) => *written == current,
            _ => false,
        }
    }

    /// Create every target's parent directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub fn ensure_directories(&self) -> Result<()> {
        for target in &self.targets {
            if let Some(parent) = target.path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create directory: {}", parent.display())
                })?;
                debug!("ensured directory exists: {}", parent.display());
            }
        }
        Ok(())
    }

    /// Targets whose existing files hold more servers than canonical,
    /// with the server names the sync would drop.
    ///
    /// This is deliberately a size heuristic (`existing > canonical`
    /// count plus a non-empty key difference), not exact superset
    /// logic.
    #[must_use]
    pub fn detect_destructive_changes(&self) -> Vec<DestructiveChange> {
        let empty = Map::new();
        let source_servers = self
            .canonical
            .get("servers")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let mut destructive = Vec::new();
        for target in &self.targets {
            let LoadedDoc::Parsed(existing) = document::load_document(&target.path) else {
                continue;
            };

            let handler = format::detect_format(&existing);
            let extracted = handler.extract(&existing);
            let Some(existing_servers) = extracted.get("servers").and_then(Value::as_object)
            else {
                continue;
            };

            if existing_servers.is_empty() || existing_servers.len() <= source_servers.len() {
                continue;
            }

            let existing_names: BTreeSet<&String> = existing_servers.keys().collect();
            let remaining_names: BTreeSet<&String> = source_servers.keys().collect();
            let lost: Vec<String> = existing_names
                .difference(&remaining_names)
                .map(|name| (*name).clone())
                .collect();

            if !lost.is_empty() {
                destructive.push(DestructiveChange {
                    app_name: target.name.clone(),
                    existing_servers: existing_names.iter().map(|n| (*n).clone()).collect(),
                    lost_servers: lost,
                    remaining_servers: remaining_names.iter().map(|n| (*n).clone()).collect(),
                });
            }
        }

        destructive
    }

    /// Write the canonical config to every target through its own
    /// dialect adapter.
    ///
    /// A `custom_overlay` is deep-merged into canonical first. When the
    /// pass would drop servers and `force` is false, the confirmation
    /// callback decides; a decline cancels every target without
    /// touching any file. Per-target failures never abort the loop.
    ///
    /// # Errors
    ///
    /// Returns an error only if target directories cannot be created.
    pub fn apply_sync(
        &mut self,
        custom_overlay: Option<&Value>,
        force: bool,
    ) -> Result<BTreeMap<String, SyncOutcome>> {
        self.ensure_directories()?;

        if let Some(overlay) = custom_overlay {
            self.canonical = document::deep_merge(&self.canonical, overlay);
        }

        let destructive = self.detect_destructive_changes();
        if !destructive.is_empty() && !force {
            let approved = match self.confirm.as_mut() {
                Some(confirm) => confirm(&destructive).unwrap_or_else(|err| {
                    warn!("confirmation prompt failed, treating as decline: {err:#}");
                    false
                }),
                None => {
                    debug!("no confirmation handler attached; declining destructive sync");
                    false
                }
            };

            if !approved {
                info!("operation cancelled by user");
                return Ok(self
                    .targets
                    .iter()
                    .map(|target| {
                        (
                            target.name.clone(),
                            SyncOutcome {
                                success: false,
                                action: SyncAction::Cancelled,
                                error: Some("user cancelled".to_string()),
                                size: None,
                                format: target.format.adapter().name(),
                            },
                        )
                    })
                    .collect());
            }
        }

        let mut results = BTreeMap::new();
        for target in &self.targets {
            let handler = target.format.adapter();

            let existing = match document::load_document(&target.path) {
                LoadedDoc::Parsed(doc) => doc,
                LoadedDoc::Absent => Value::Object(Map::new()),
                LoadedDoc::Invalid(err) => {
                    error!(
                        "skipping update for {} at {}: {err}",
                        target.name,
                        target.path.display()
                    );
                    results.insert(
                        target.name.clone(),
                        SyncOutcome {
                            success: false,
                            action: SyncAction::Skipped,
                            error: Some("failed to parse existing config".to_string()),
                            size: None,
                            format: handler.name(),
                        },
                    );
                    continue;
                }
            };

            let file_existed = target.path.exists();
            let updated = handler.merge(&existing, &self.canonical);

            match document::write_document(&target.path, &updated) {
                Ok(written) => {
                    self.last_written.insert(target.name.clone(), written.digest);
                    let action = if file_existed {
                        SyncAction::Updated
                    } else {
                        SyncAction::Created
                    };
                    info!(
                        "successfully {} config for {} at {} using {} format",
                        action.as_str(),
                        target.name,
                        target.path.display(),
                        handler.name()
                    );
                    results.insert(
                        target.name.clone(),
                        SyncOutcome {
                            success: true,
                            action,
                            error: None,
                            size: Some(written.size),
                            format: handler.name(),
                        },
                    );
                }
                Err(err) => {
                    error!(
                        "failed to update config for {} at {}: {err:#}",
                        target.name,
                        target.path.display()
                    );
                    results.insert(
                        target.name.clone(),
                        SyncOutcome {
                            success: false,
                            action: SyncAction::Failed,
                            error: Some(format!("{err:#}")),
                            size: None,
                            format: handler.name(),
                        },
                    );
                }
            }
        }

        Ok(results)
    }

    /// Reload every target and compare its extracted config against the
    /// reference (canonical by default). One missing or malformed file
    /// marks that app out of sync without aborting the others.
    #[must_use]
    pub fn validate_all(
        &self,
        reference: Option<&Value>,
    ) -> (bool, BTreeMap<String, ValidationOutcome>) {
        let reference = reference.unwrap_or(&self.canonical);

        let mut all_in_sync = true;
        let mut results = BTreeMap::new();

        for target in &self.targets {
            let outcome = Self::validate_target(target, reference);
            if !outcome.in_sync {
                all_in_sync = false;
            }
            results.insert(target.name.clone(), outcome);
        }

        if all_in_sync {
            info!("all configuration files are in sync with the reference configuration");
        }

        (all_in_sync, results)
    }

    fn validate_target(target: &AppTarget, reference: &Value) -> ValidationOutcome {
        let doc = match document::load_document(&target.path) {
            LoadedDoc::Absent => {
                warn!(
                    "config file missing for {} at {}",
                    target.name,
                    target.path.display()
                );
                return ValidationOutcome {
                    in_sync: false,
                    reason: Some("missing"),
                    mismatched_keys: Vec::new(),
                    format: None,
                };
            }
            LoadedDoc::Invalid(err) => {
                warn!(
                    "config file for {} at {} could not be parsed: {err}",
                    target.name,
                    target.path.display()
                );
                return ValidationOutcome {
                    in_sync: false,
                    reason: Some("parse_error"),
                    mismatched_keys: Vec::new(),
                    format: None,
                };
            }
            LoadedDoc::Parsed(doc) => doc,
        };

        let handler = format::detect_format(&doc);
        let extracted = handler.extract(&doc);

        let mismatched_keys = if handler.kind() == FormatKind::ClaudeDesktop {
            // Claude's dialect holds nothing but the server map, so only
            // the servers are comparable.
            let empty = Value::Object(Map::new());
            let ref_servers = reference.get("servers").unwrap_or(&empty);
            let app_servers = extracted.get("servers").unwrap_or(&empty);

            let ref_servers_empty = ref_servers.as_object().is_none_or(Map::is_empty);
            let reference_nonempty = reference.as_object().is_some_and(|m| !m.is_empty());
            if ref_servers_empty && reference_nonempty {
                // Reference is in a legacy shape; no meaningful
                // comparison is possible against Claude's dialect.
                info!(
                    "skipping validation for {} - reference config is in legacy format",
                    target.name
                );
                return ValidationOutcome {
                    in_sync: true,
                    reason: Some("format_mismatch_skip"),
                    mismatched_keys: Vec::new(),
                    format: Some(handler.name()),
                };
            }

            if app_servers == ref_servers {
                Vec::new()
            } else {
                vec!["servers (content mismatch)".to_string()]
            }
        } else {
            let mut mismatched = Vec::new();
            Self::check_nested(reference, &extracted, "", &mut mismatched);
            mismatched
        };

        if mismatched_keys.is_empty() {
            ValidationOutcome {
                in_sync: true,
                reason: None,
                mismatched_keys,
                format: Some(handler.name()),
            }
        } else {
            warn!(
                "config mismatch detected for {} at {}: {}",
                target.name,
                target.path.display(),
                mismatched_keys.join(", ")
            );
            ValidationOutcome {
                in_sync: false,
                reason: Some("mismatch"),
                mismatched_keys,
                format: Some(handler.name()),
            }
        }
    }

    /// Walk the reference config's keys, recording missing keys and
    /// unequal leaves. The synthetic `format` tag is metadata, not
    /// config data, and is skipped.
    fn check_nested(reference: &Value, actual: &Value, path: &str, mismatched: &mut Vec<String>) {
        let Some(ref_map) = reference.as_object() else {
            return;
        };

        for (key, ref_value) in ref_map {
            if key == "format" {
                continue;
            }

            let Some(app_value) = actual.get(key) else {
                mismatched.push(format!("{path}{key} (missing)"));
                continue;
            };

            if ref_value.is_object() && app_value.is_object() {
                Self::check_nested(ref_value, app_value, &format!("{path}{key}."), mismatched);
            } else if ref_value != app_value {
                mismatched.push(format!("{path}{key} (value mismatch)"));
            }
        }
    }

    /// Resolve a source (app name or literal path), load it, and
    /// extract its MCP config without mutating any state.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is absent, unparsable, or
    /// extracts to an empty mapping.
    pub fn extract_source(&self, source: &str) -> Result<(String, Value)> {
        let (source_name, source_path) = match self.target_named(source) {
            Some(target) => (target.name.clone(), target.path.clone()),
            None => (source.to_string(), PathBuf::from(source)),
        };

        let doc = match document::load_document(&source_path) {
            LoadedDoc::Absent => {
                anyhow::bail!("source file does not exist: {}", source_path.display())
            }
            LoadedDoc::Invalid(err) => anyhow::bail!(
                "failed to parse source configuration at {}: {err}",
                source_path.display()
            ),
            LoadedDoc::Parsed(doc) => doc,
        };

        let handler = format::detect_format(&doc);
        let extracted = handler.extract(&doc);

        if extracted.as_object().is_none_or(Map::is_empty) {
            anyhow::bail!("no MCP configuration found in {}", source_path.display());
        }

        info!(
            "loaded reference MCP configuration from {source_name} using {} format",
            handler.name()
        );
        Ok((source_name, extracted))
    }

    /// Run one full pass: adopt the source's MCP config as canonical,
    /// write it through every target, validate, and report.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or extracted; no
    /// state is mutated in that case. Per-target write and validation
    /// failures are recorded in the report instead.
    pub fn sync_from_source(&mut self, source: &str, force: bool) -> Result<SyncReport> {
        let (source_name, extracted) = self.extract_source(source)?;

        self.canonical = extracted;

        let sync_results = self.apply_sync(None, force)?;
        let (_, validation_results) = self.validate_all(None);

        Ok(SyncReport {
            source: source_name,
            sync_results,
            validation_results,
        })
    }
}
