//! The file-watch daemon
//!
//! Wires a filesystem-watch subscription to the debouncer and the
//! synchronizer and runs until stopped.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use super::WatchError;
use super::debouncer::{ChangeDebouncer, DebounceAction};
use crate::apps::AppTarget;
use crate::sync::{SyncReporter, Synchronizer};

/// Watches application config directories and re-synchronizes when a
/// watched file changes externally.
pub struct SyncDaemon {
    synchronizer: Arc<Mutex<Synchronizer>>,
    debounce: Duration,
    force: bool,
    watch_apps: Vec<String>,
    shutdown: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl SyncDaemon {
    /// Create a daemon around a synchronizer. All of the
    /// synchronizer's targets are watched unless narrowed with
    /// [`SyncDaemon::with_watch_apps`].
    #[must_use]
    pub fn new(synchronizer: Synchronizer, debounce: Duration, force: bool) -> Self {
        Self {
            synchronizer: Arc::new(Mutex::new(synchronizer)),
            debounce,
            force,
            watch_apps: Vec::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Restrict watching to the named applications. An empty list means
    /// all targets. Syncs still write every target.
    #[must_use]
    pub fn with_watch_apps(mut self, apps: Vec<String>) -> Self {
        self.watch_apps = apps;
        self
    }

    /// Flag that ends the run loop when set; hand this to a signal
    /// handler.
    #[must_use]
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Stop the daemon and block until the watch subsystem has fully
    /// quiesced.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        while self.running.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Run until [`SyncDaemon::stop`] is called or the shutdown flag is
    /// set.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to watch or the watcher
    /// cannot be installed.
    pub fn run(&self) -> Result<(), WatchError> {
        let watched_targets = self.watched_targets();
        if watched_targets.is_empty() {
            return Err(WatchError::NoTargets);
        }

        // Directories must exist before they can be watched; target
        // files themselves may not exist yet.
        self.lock_synchronizer()
            .ensure_directories()
            .map_err(WatchError::Setup)?;

        let debouncer = ChangeDebouncer::new(self.debounce, self.sync_action());

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
            let _ = tx.send(event);
        })?;

        let mut watched_dirs: Vec<PathBuf> = Vec::new();
        for target in &watched_targets {
            let Some(dir) = target.path.parent() else {
                continue;
            };
            if watched_dirs.iter().any(|watched| watched == dir) {
                continue;
            }
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            info!("watching directory: {}", dir.display());
            watched_dirs.push(dir.to_path_buf());
        }

        info!(
            "MCP config sync daemon started; watching {} app(s), debounce {:?}",
            watched_targets.len(),
            self.debounce
        );
        self.running.store(true, Ordering::SeqCst);

        while !self.shutdown.load(Ordering::SeqCst) {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(Ok(event)) => self.dispatch(&event, &watched_targets, &debouncer),
                Ok(Err(err)) => warn!("filesystem watch error: {err}"),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("watch event channel closed");
                    break;
                }
            }
        }

        // Unsubscribes every directory listener.
        drop(watcher);
        self.running.store(false, Ordering::SeqCst);
        info!("daemon stopped");
        Ok(())
    }

    /// The action the debouncer fires once a window elapses: one full
    /// sync pass from the changed app. Errors are logged, never
    /// propagated into the watch loop.
    fn sync_action(&self) -> DebounceAction {
        let synchronizer = Arc::clone(&self.synchronizer);
        let force = self.force;

        Arc::new(move |app: &str, path: &Path| {
            info!("starting automatic sync from {app} ({})", path.display());
            let outcome = synchronizer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .sync_from_source(app, force);

            match outcome {
                Ok(report) => {
                    info!("{}", SyncReporter::render(&report));
                    if report.succeeded() {
                        info!("automatic sync from {app} completed successfully");
                    } else {
                        warn!("automatic sync from {app} completed with issues");
                    }
                }
                Err(err) => error!("automatic sync from {app} failed: {err:#}"),
            }
        })
    }

    fn dispatch(&self, event: &Event, targets: &[AppTarget], debouncer: &ChangeDebouncer) {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return;
        }

        for path in &event.paths {
            let Some(target) = targets.iter().find(|target| same_file(&target.path, path))
            else {
                continue;
            };

            if self.lock_synchronizer().matches_last_write(&target.name, path) {
                debug!("ignoring echo of our own write to {}", path.display());
                continue;
            }

            debouncer.handle_event(&target.name, path);
        }
    }

    fn watched_targets(&self) -> Vec<AppTarget> {
        self.lock_synchronizer()
            .targets()
            .iter()
            .filter(|target| {
                self.watch_apps.is_empty()
                    || self.watch_apps.iter().any(|app| *app == target.name)
            })
            .cloned()
            .collect()
    }

    fn lock_synchronizer(&self) -> std::sync::MutexGuard<'_, Synchronizer> {
        self.synchronizer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whether two paths refer to the same file. Event paths may be
/// canonicalized differently from configured target paths.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::format::FormatKind;

    fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        while std::time::Instant::now() < deadline {
            if check() {
                return true;
            }
            thread::sleep(Duration::from_millis(50));
        }
        false
    }

    #[test]
    fn test_no_targets_is_an_error() {
        let daemon = SyncDaemon::new(
            Synchronizer::new(Vec::new()),
            Duration::from_millis(50),
            false,
        );
        assert!(matches!(daemon.run(), Err(WatchError::NoTargets)));
    }

    #[test]
    fn test_matches_last_write_recognizes_own_output() {
        let tmp = TempDir::new().unwrap();
        let claude = AppTarget::new(
            "Claude",
            tmp.path().join("claude.json"),
            FormatKind::ClaudeDesktop,
        );
        let claude_path = claude.path.clone();
        let source_path = tmp.path().join("source.json");
        fs::write(
            &source_path,
            serde_json::to_string(&json!({"mcpServers": {"fs": {"command": "npx"}}})).unwrap(),
        )
        .unwrap();

        let mut synchronizer = Synchronizer::new(vec![claude]);
        synchronizer
            .sync_from_source(source_path.to_str().unwrap(), false)
            .unwrap();

        // Our own write is an echo...
        assert!(synchronizer.matches_last_write("Claude", &claude_path));

        // ...an external edit is not.
        fs::write(&claude_path, "{\"mcpServers\": {}}").unwrap();
        assert!(!synchronizer.matches_last_write("Claude", &claude_path));
    }

    #[test]
    fn test_external_change_triggers_resync() {
        let tmp = TempDir::new().unwrap();
        let cursor_dir = tmp.path().join("cursor");
        let claude_dir = tmp.path().join("claude");
        fs::create_dir_all(&cursor_dir).unwrap();
        fs::create_dir_all(&claude_dir).unwrap();

        let cursor = AppTarget::new("Cursor", cursor_dir.join("mcp.json"), FormatKind::Cursor);
        let claude = AppTarget::new(
            "Claude",
            claude_dir.join("claude_desktop_config.json"),
            FormatKind::ClaudeDesktop,
        );
        let cursor_path = cursor.path.clone();
        let claude_path = claude.path.clone();

        let daemon = Arc::new(SyncDaemon::new(
            Synchronizer::new(vec![cursor, claude]),
            Duration::from_millis(100),
            false,
        ));

        let runner = Arc::clone(&daemon);
        let handle = thread::spawn(move || runner.run());

        // Give the watcher time to establish its subscriptions.
        thread::sleep(Duration::from_millis(500));

        fs::write(
            &cursor_path,
            serde_json::to_string_pretty(&json!({
                "mcpServers": {},
                "mcp": {"servers": {"fs": {"command": "npx"}}}
            }))
            .unwrap(),
        )
        .unwrap();

        let synced = wait_until(Duration::from_secs(5), || claude_path.exists());

        daemon.stop();
        let run_result = handle.join().unwrap();
        assert!(run_result.is_ok());
        assert!(synced, "daemon did not propagate the external change");

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&claude_path).unwrap()).unwrap();
        assert_eq!(written["mcpServers"]["fs"]["command"], "npx");
    }
}
