//! Known application registry and install-state discovery
//!
//! Every application this tool can synchronize is listed here with the
//! location of its config file and the directory whose existence marks
//! the app as installed. Discovery runs once at startup; the resulting
//! target list is immutable for the rest of the run.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::format::FormatKind;

/// One application whose config file participates in synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppTarget {
    /// Display name; also the key used in reports and watch scheduling.
    pub name: String,
    /// Absolute path of the app's config file.
    pub path: PathBuf,
    /// Dialect the app's file is written in, regardless of what dialect
    /// an existing file happens to be in.
    pub format: FormatKind,
}

impl AppTarget {
    /// Create a target.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, format: FormatKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            format,
        }
    }
}

/// A known application: config location plus the install probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownApp {
    /// Application name.
    pub name: &'static str,
    /// Where the app keeps its MCP-bearing config file.
    pub config_path: PathBuf,
    /// Directory whose existence indicates the app is installed.
    pub probe_dir: PathBuf,
    /// The app's write dialect.
    pub format: FormatKind,
}

/// All applications this tool knows how to synchronize.
///
/// Empty when the home/config directories cannot be resolved.
#[must_use]
pub fn known_apps() -> Vec<KnownApp> {
    let (Some(home), Some(app_support)) = (dirs::home_dir(), dirs::config_dir()) else {
        warn!("could not resolve home or config directory; no applications available");
        return Vec::new();
    };

    let roo_settings = "globalStorage/rooveterinaryinc.roo-cline/settings";

    vec![
        KnownApp {
            name: "Cursor",
            config_path: home.join(".cursor/mcp.json"),
            probe_dir: home.join(".cursor"),
            format: FormatKind::for_app("Cursor"),
        },
        KnownApp {
            name: "Windsurf",
            config_path: home.join(".codeium/windsurf/mcp_config.json"),
            probe_dir: home.join(".codeium/windsurf"),
            format: FormatKind::for_app("Windsurf"),
        },
        KnownApp {
            name: "Claude",
            config_path: app_support.join("Claude/claude_desktop_config.json"),
            probe_dir: app_support.join("Claude"),
            format: FormatKind::for_app("Claude"),
        },
        KnownApp {
            name: "VSCode",
            config_path: app_support.join("Code/User/settings.json"),
            probe_dir: app_support.join("Code"),
            format: FormatKind::for_app("VSCode"),
        },
        KnownApp {
            name: "Roocode-VSCode",
            config_path: app_support
                .join("Code/User")
                .join(roo_settings)
                .join("cline_mcp_settings.json"),
            probe_dir: app_support.join("Code"),
            format: FormatKind::for_app("Roocode-VSCode"),
        },
        KnownApp {
            name: "Roocode-Windsurf",
            config_path: app_support
                .join("Windsurf - Next/User")
                .join(roo_settings)
                .join("mcp_settings.json"),
            probe_dir: app_support.join("Windsurf - Next"),
            format: FormatKind::for_app("Roocode-Windsurf"),
        },
    ]
}

/// Known applications actually installed on this host, as sync targets.
#[must_use]
pub fn discover_installed() -> Vec<AppTarget> {
    let mut targets = Vec::new();

    for app in known_apps() {
        if app.probe_dir.is_dir() {
            debug!("application {} detected at {}", app.name, app.probe_dir.display());
            targets.push(AppTarget::new(app.name, app.config_path, app.format));
        } else {
            debug!(
                "application {} not found (directory {} does not exist)",
                app.name,
                app.probe_dir.display()
            );
        }
    }

    info!(
        "detected {} installed application(s): {}",
        targets.len(),
        targets
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    targets
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_known_app_names_are_unique() {
        let apps = known_apps();
        let names: HashSet<&str> = apps.iter().map(|app| app.name).collect();
        assert_eq!(names.len(), apps.len());
    }

    #[test]
    fn test_known_app_paths_are_distinct() {
        let apps = known_apps();
        let paths: HashSet<&PathBuf> = apps.iter().map(|app| &app.config_path).collect();
        assert_eq!(paths.len(), apps.len());
    }

    #[test]
    fn test_known_apps_carry_their_write_dialect() {
        for app in known_apps() {
            assert_eq!(app.format, FormatKind::for_app(app.name));
        }
    }

    #[test]
    fn test_discover_is_subset_of_known() {
        let known: HashSet<&'static str> = known_apps().iter().map(|app| app.name).collect();
        for target in discover_installed() {
            assert!(known.contains(target.name.as_str()));
        }
    }
}
