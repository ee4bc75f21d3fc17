use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "definery")]
#[command(about = "Browse, import and organize shared parameters on a Definery server")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "definery.toml")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON log lines instead of the compact format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List shared parameters page by page
    List {
        /// Show a collection instead of your own parameters
        #[arg(long)]
        collection: Option<String>,

        /// Page to show (1-based)
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// List your collections
    Collections,

    /// Create a new collection
    NewCollection {
        name: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Add existing parameters to a collection
    AddToCollection {
        #[arg(long)]
        collection: String,

        #[arg(required = true)]
        parameter_ids: Vec<String>,
    },

    /// Create a single shared parameter
    NewParameter {
        name: String,

        #[arg(long)]
        data_type: String,

        #[arg(long)]
        collection: String,

        #[arg(long, default_value = "")]
        group: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Use this GUID instead of generating one
        #[arg(long)]
        guid: Option<uuid::Uuid>,

        #[arg(long)]
        hidden: bool,

        /// Prevent users from editing the value
        #[arg(long)]
        locked: bool,
    },

    /// Upload a shared parameter file into a collection
    Upload {
        file: PathBuf,

        #[arg(long)]
        collection: String,

        /// Abort on the first unreadable line instead of skipping it
        #[arg(long)]
        strict: bool,

        /// Report what would be created without creating anything
        #[arg(long)]
        dry_run: bool,

        /// Write a tab-separated audit report of every decision
        #[arg(long)]
        report: Option<PathBuf>,
    },
}
