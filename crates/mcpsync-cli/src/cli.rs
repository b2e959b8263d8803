use clap::{Parser, Subcommand};

/// MCP Configuration Synchronization Tool
///
/// Keep Model Context Protocol server definitions consistent across
/// desktop applications that store them in different JSON dialects
#[derive(Parser, Debug)]
#[command(name = "mcpsync")]
#[command(about, long_about = None, version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize all applications from a source app or config file
    Sync {
        /// Source application name (e.g. "Claude") or path to a config file
        source: String,

        /// Apply destructive changes without prompting
        #[arg(long)]
        force: bool,
    },

    /// Check whether application configs agree with a reference
    Validate {
        /// Application name or file to validate against
        #[arg(long, value_name = "SOURCE")]
        source: Option<String>,
    },

    /// List applications detected on this machine
    Apps,

    /// Watch config files and re-synchronize on external changes
    Watch {
        /// Debounce window in seconds
        #[arg(long, value_name = "SECS")]
        debounce: Option<u64>,

        /// Apply destructive changes without prompting
        #[arg(long)]
        force: bool,
    },
}
