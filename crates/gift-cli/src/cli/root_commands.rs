use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Message schemas.
    Schema {
        #[command(subcommand)]
        action: SchemaCommands,
    },
    /// Validate a message file against its schema and field rules.
    Validate(FileArgs),
    /// Show every node of a performance assessment message.
    Inspect(FileArgs),
    /// Summarize the course records in an LMS data reply message.
    Records(RecordsArgs),
    /// Print the effective configuration.
    Config,
}

#[derive(Clone, Debug, Subcommand)]
pub enum SchemaCommands {
    /// List registered schema names.
    List,
    /// Print one schema.
    Show {
        /// Message type name, or `Message` for the envelope.
        name: String,
    },
}

#[derive(Clone, Debug, Args)]
pub struct FileArgs {
    /// Path to a JSON message file.
    pub file: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct RecordsArgs {
    /// Path to a JSON message file.
    pub file: PathBuf,

    /// List this domain's records instead of a per-domain summary.
    #[arg(long)]
    pub domain: Option<String>,

    /// Oldest first (default is newest first).
    #[arg(long)]
    pub ascending: bool,
}
