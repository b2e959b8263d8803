use anyhow::Context;
use mcpsync_core::apps;
use mcpsync_core::sync::{OverallStatus, SyncReporter, Synchronizer};

use crate::interactive;

pub struct Sync;

impl Sync {
    pub fn execute(source: &str, force: bool) -> anyhow::Result<()> {
        let targets = apps::discover_installed();
        if targets.is_empty() {
            anyhow::bail!("no supported applications detected on this machine");
        }

        let mut synchronizer = Synchronizer::new(targets)
            .with_confirmation(interactive::destructive_confirmation());

        let report = synchronizer
            .sync_from_source(source, force)
            .context("Sync operation failed")?;

        println!("{}", SyncReporter::render(&report));

        match report.status() {
            OverallStatus::Success => Ok(()),
            status => anyhow::bail!("synchronization finished with status {status}"),
        }
    }
}
