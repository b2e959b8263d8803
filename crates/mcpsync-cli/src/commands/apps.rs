use mcpsync_core::apps;

pub struct Apps;

impl Apps {
    pub fn execute() -> anyhow::Result<()> {
        let targets = apps::discover_installed();

        if targets.is_empty() {
            println!("No supported applications detected on this machine.");
            return Ok(());
        }

        println!("Detected {} application(s):\n", targets.len());
        for target in &targets {
            println!(
                "  {:<18} {:<28} {}",
                target.name,
                target.format.adapter().name(),
                target.path.display()
            );
        }

        Ok(())
    }
}
