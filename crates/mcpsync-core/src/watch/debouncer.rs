//! Per-app debouncing of filesystem change events
//!
//! Each app's state machine is Idle → Pending → Idle. An event during
//! the pending window cancels and replaces the timer (resetting the
//! window and keeping the newest path); an event while the app's sync
//! is executing is dropped, which keeps the watcher from reacting to
//! the write that sync is about to produce.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info};

/// Action invoked when an app's debounce window elapses. Receives the
/// app name and the path from the most recent event.
pub type DebounceAction = Arc<dyn Fn(&str, &Path) + Send + Sync>;

struct PendingSlot {
    generation: u64,
    path: PathBuf,
}

#[derive(Default)]
struct DebounceState {
    pending: HashMap<String, PendingSlot>,
    in_flight: HashSet<String>,
    next_generation: u64,
}

/// Coalesces rapid config-file modifications into a single action per
/// app. Timer callbacks and the event handler share one lock around
/// the pending-slot table.
pub struct ChangeDebouncer {
    delay: Duration,
    action: DebounceAction,
    state: Arc<Mutex<DebounceState>>,
}

impl ChangeDebouncer {
    /// Create a debouncer firing `action` after `delay` of quiet.
    #[must_use]
    pub fn new(delay: Duration, action: DebounceAction) -> Self {
        Self {
            delay,
            action,
            state: Arc::new(Mutex::new(DebounceState::default())),
        }
    }

    /// Handle one modification event for `app`.
    pub fn handle_event(&self, app: &str, path: &Path) {
        let generation = {
            let mut state = lock(&self.state);

            if state.in_flight.contains(app) {
                debug!("sync already running for {app}, ignoring change");
                return;
            }

            state.next_generation += 1;
            let generation = state.next_generation;
            let replaced = state
                .pending
                .insert(
                    app.to_string(),
                    PendingSlot {
                        generation,
                        path: path.to_path_buf(),
                    },
                )
                .is_some();

            if replaced {
                debug!("debounce window reset for {app}");
            } else {
                info!("detected external change in {app} config: {}", path.display());
            }

            generation
        };

        self.spawn_timer(app.to_string(), generation);
    }

    fn spawn_timer(&self, app: String, generation: u64) {
        let state = Arc::clone(&self.state);
        let action = Arc::clone(&self.action);
        let delay = self.delay;

        thread::spawn(move || {
            thread::sleep(delay);

            let path = {
                let mut guard = lock(&state);
                let current = guard.pending.get(&app).map(|slot| slot.generation);
                if current != Some(generation) {
                    // A newer event superseded this timer.
                    return;
                }
                let Some(slot) = guard.pending.remove(&app) else {
                    return;
                };
                guard.in_flight.insert(app.clone());
                slot.path
            };

            // The in-flight slot must be cleared no matter how the
            // action ends; a panic here must not leak into the watch
            // loop or leave the app permanently suppressed.
            let outcome =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| action(&app, &path)));
            if outcome.is_err() {
                error!("debounced sync action panicked for {app}");
            }

            lock(&state).in_flight.remove(&app);
        });
    }
}

fn lock(state: &Mutex<DebounceState>) -> MutexGuard<'_, DebounceState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
