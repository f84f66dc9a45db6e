use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// llmctl - switch between named LLM provider configurations
#[derive(Parser)]
#[command(name = "llmctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file (skips discovery)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configurations, declared providers, and built-in providers
    List,

    /// Make a saved configuration the default and persist the change
    Use {
        /// Configuration name
        name: String,
    },

    /// Validate the document and preview a resolution without activating it
    Check {
        /// Configuration name to preview (defaults to the declared default)
        name: Option<String>,

        /// Preview a raw provider instead of a saved configuration
        #[arg(long, requires = "model", conflicts_with = "name")]
        provider: Option<String>,

        /// Model to pair with --provider
        #[arg(long, requires = "provider")]
        model: Option<String>,
    },

    /// Show the discovered file, default configuration, and live environment
    Status,

    /// Activate a configuration, then run a downstream tool with it
    Run {
        /// Saved configuration name (defaults to the declared default)
        #[arg(short, long)]
        name: Option<String>,

        /// Activate a raw provider instead of a saved configuration
        #[arg(long, requires = "model", conflicts_with = "name")]
        provider: Option<String>,

        /// Model to pair with --provider
        #[arg(long, requires = "provider")]
        model: Option<String>,

        /// The downstream tool and its arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        tool: Vec<String>,
    },
}
