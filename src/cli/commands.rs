//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// HCB transparency API connector CLI
#[derive(Parser, Debug)]
#[command(name = "hcb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// State file for poll cursors (JSON)
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported resources
    Resources,

    /// Fetch one object by identifier
    Get {
        /// Resource tag or API path (e.g. `transaction`, `card_charges`)
        resource: String,

        /// Object identifier (organization ID or slug for `organization`)
        id: String,

        /// Related objects to inline (comma-separated)
        #[arg(long, default_value = "")]
        expand: String,
    },

    /// List objects of a resource
    List {
        /// Resource tag or API path
        resource: String,

        /// Organization ID or slug (required for nested resources)
        #[arg(short, long)]
        org: Option<String>,

        /// Fetch every page
        #[arg(long, conflicts_with = "limit")]
        all: bool,

        /// Maximum number of objects (1-100)
        #[arg(short, long, default_value = "50")]
        limit: u32,

        /// Related objects to inline (comma-separated)
        #[arg(long, default_value = "")]
        expand: String,
    },

    /// Run an action over a parameter file
    Execute {
        /// Parameters file (JSON)
        #[arg(short, long, conflicts_with = "params_json")]
        params: Option<PathBuf>,

        /// Inline parameters JSON
        #[arg(long)]
        params_json: Option<String>,

        /// Emit error records instead of aborting on a failed item
        #[arg(long)]
        continue_on_fail: bool,
    },

    /// Poll an organization listing for new items
    Poll {
        /// `transaction` or `donation`
        #[arg(default_value = "transaction")]
        resource: String,

        /// Organization ID or slug
        #[arg(short, long)]
        org: String,

        /// Related objects to inline (comma-separated)
        #[arg(long, default_value = "")]
        expand: String,

        /// Preview the newest item without advancing the cursor
        #[arg(long)]
        manual: bool,

        /// Keep polling every N seconds until interrupted
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

impl Commands {
    /// Subcommand name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Resources => "resources",
            Commands::Get { .. } => "get",
            Commands::List { .. } => "list",
            Commands::Execute { .. } => "execute",
            Commands::Poll { .. } => "poll",
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one object per line)
    Json,
    /// Indented JSON
    Pretty,
}
