//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Local structure store and sync version gate.
#[derive(Debug, Parser)]
#[command(name = "structura", version, about)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, env = "STRUCTURA_CONFIG", default_value = "structura.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import a JSON array of structure features in a single transaction.
    Import {
        /// File holding the JSON array (`null` is accepted and rejected as empty).
        file: PathBuf,
    },
    /// Show structures by server id (comma-separated for several) or by client UUID.
    Get {
        #[arg(
            long,
            value_delimiter = ',',
            conflicts_with = "uuid",
            required_unless_present = "uuid"
        )]
        id: Vec<String>,
        #[arg(long)]
        uuid: Option<String>,
    },
    /// List the structures under a parent location.
    Children {
        parent_id: String,
        /// Only structures of this type (e.g. "Residential Structure").
        #[arg(long = "type")]
        location_type: Option<String>,
    },
    /// List every stored structure.
    List,
    /// Manage server-delivered settings.
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    /// Check whether this client version may synchronize. Exits with 2 when blocked.
    SyncCheck,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Store a structured setting document as delivered by the server.
    Load {
        file: PathBuf,
        /// Store under this key instead of the document's identifier.
        #[arg(long)]
        key: Option<String>,
    },
    /// Store a flat value.
    Put { key: String, value: String },
}
