use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Context;
use mcpsync_core::apps;
use mcpsync_core::settings::Settings;
use mcpsync_core::sync::Synchronizer;
use mcpsync_core::watch::SyncDaemon;

pub struct Watch;

impl Watch {
    pub fn execute(debounce_secs: Option<u64>, force: bool) -> anyhow::Result<()> {
        let settings = Settings::load().context("Failed to load settings")?;

        let targets = apps::discover_installed();
        if targets.is_empty() {
            anyhow::bail!("no supported applications detected on this machine");
        }

        let debounce: Duration = settings.debounce(debounce_secs);
        let force = force || settings.force;

        let daemon = Arc::new(
            SyncDaemon::new(Synchronizer::new(targets), debounce, force)
                .with_watch_apps(settings.watch.clone()),
        );

        let shutdown = daemon.shutdown_flag();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::SeqCst);
        })
        .context("Failed to install interrupt handler")?;

        println!("Watching for config changes. Press Ctrl+C to stop.");
        daemon.run().context("Watch daemon failed")?;

        Ok(())
    }
}
