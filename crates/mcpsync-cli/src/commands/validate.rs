use mcpsync_core::apps;
use mcpsync_core::sync::Synchronizer;

pub struct Validate;

impl Validate {
    pub fn execute(source: Option<&str>) -> anyhow::Result<()> {
        let targets = apps::discover_installed();
        if targets.is_empty() {
            anyhow::bail!("no supported applications detected on this machine");
        }

        let synchronizer = Synchronizer::new(targets);

        // With no explicit source, cross-check against the first target
        // that yields a non-empty extraction.
        let (reference_name, reference) = match source {
            Some(source) => synchronizer.extract_source(source)?,
            None => {
                let mut found = None;
                for target in synchronizer.targets() {
                    if let Ok(extracted) = synchronizer.extract_source(&target.name) {
                        found = Some(extracted);
                        break;
                    }
                }
                found.ok_or_else(|| {
                    anyhow::anyhow!("no application config found to validate against")
                })?
            }
        };

        println!("Validating against {reference_name}\n");

        let (all_in_sync, results) = synchronizer.validate_all(Some(&reference));

        for (app, outcome) in &results {
            if outcome.in_sync {
                println!("  {app:<18} ✓ in sync");
            } else {
                let reason = outcome.reason.unwrap_or("unknown");
                println!("  {app:<18} ✗ {reason}");
                for key in &outcome.mismatched_keys {
                    println!("  {:<18}   {key}", "");
                }
            }
        }

        if all_in_sync {
            println!("\nAll configuration files are in sync.");
            Ok(())
        } else {
            anyhow::bail!("some configuration files are out of sync")
        }
    }
}
