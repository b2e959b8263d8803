//! Interactive prompting for destructive sync operations

use dialoguer::Confirm;
use mcpsync_core::sync::{ConfirmCallback, SyncReporter};

/// Build the confirmation callback handed to the synchronizer: show the
/// destructive-change table, then ask. An interrupted or failed prompt
/// counts as "abort".
pub fn destructive_confirmation() -> ConfirmCallback {
    Box::new(|changes| {
        println!("{}", SyncReporter::render_destructive(changes));

        let proceed = Confirm::new()
            .with_prompt("Do you want to continue with this destructive operation?")
            .default(false)
            .interact()
            .unwrap_or(false);

        if !proceed {
            eprintln!("Operation cancelled by user");
        }

        Ok(proceed)
    })
}
