//! # structura — command-line composition root
//!
//! Wires the `SQLite` adapter into the application services and exposes
//! them as subcommands.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Install the `tracing` subscriber
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Run the requested command and map its outcome to an exit code
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod cli;
mod config;
mod platform;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use structura_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteSettingsRepository, SqliteStructureRepository,
};
use structura_app::ports::SettingsRepository;
use structura_app::services::structure_service::StructureService;
use structura_app::services::sync_gate::SyncVersionGate;
use structura_domain::setting::{Setting, SettingConfiguration};

use crate::cli::{Cli, Command, SettingsCommand};
use crate::config::Config;
use crate::platform::ConfiguredVersion;

/// Exit code reported by `sync-check` when the installed version is blocked.
const EXIT_BLOCKED: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config).context("loading configuration")?;
    init_tracing(&config.logging.filter);

    let db = DatabaseConfig::new(config.database_url())
        .build()
        .await
        .context("opening database")?;
    tracing::info!(url = config.database_url(), "database ready");
    let pool = db.pool().clone();

    // Services
    let structures = StructureService::new(SqliteStructureRepository::new(pool.clone()));
    let settings = SqliteSettingsRepository::new(pool);

    match cli.command {
        Command::Import { file } => {
            let payload = read_json(&file)?;
            let batch = structure_batch(&payload)
                .with_context(|| format!("{} must hold a JSON array", file.display()))?;
            let count = batch.map_or(0, <[_]>::len);
            if !structures.import_structures(batch).await {
                tracing::warn!(file = %file.display(), count, "import failed");
                eprintln!("import failed: nothing was stored");
                return Ok(ExitCode::FAILURE);
            }
            println!("imported {count} structures");
        }
        Command::Get { id, uuid } => match (id.as_slice(), uuid) {
            ([single], _) => print_json(&structures.get_structure(single).await?)?,
            ([], Some(uuid)) => print_json(&structures.find_by_uuid(&uuid).await?)?,
            ([], None) => bail!("either --id or --uuid is required"),
            (ids, _) => print_json(&structures.get_structures(ids).await?)?,
        },
        Command::Children {
            parent_id,
            location_type,
        } => {
            let children = structures
                .children_of(&parent_id, location_type.as_deref())
                .await?;
            print_json(&children)?;
        }
        Command::List => {
            print_json(&structures.list_structures().await?)?;
        }
        Command::Settings { command } => match command {
            SettingsCommand::Load { file, key } => {
                let document = read_json(&file)?;
                let configuration: SettingConfiguration = serde_json::from_value(document)
                    .with_context(|| format!("{} is not a setting document", file.display()))?;
                let key = key.unwrap_or_else(|| configuration.identifier.clone());
                let setting = Setting::structured(key, &configuration)?;
                settings.put_setting(&setting).await?;
                println!("stored setting {}", setting.identifier);
            }
            SettingsCommand::Put { key, value } => {
                settings.put(&key, &value).await?;
                println!("stored {key}");
            }
        },
        Command::SyncCheck => {
            let gate = SyncVersionGate::new(settings, ConfiguredVersion::from(&config.app));
            if gate.is_app_version_allowed().await? {
                println!("allowed");
            } else {
                tracing::warn!("installed version is below the published minimum");
                println!("blocked: update the application before syncing");
                return Ok(ExitCode::from(EXIT_BLOCKED));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Interpret an import payload: `null` is passed on as a missing batch.
fn structure_batch(payload: &serde_json::Value) -> anyhow::Result<Option<&[serde_json::Value]>> {
    match payload {
        serde_json::Value::Null => {
            tracing::warn!("import payload is null");
            Ok(None)
        }
        serde_json::Value::Array(items) => Ok(Some(items.as_slice())),
        other => bail!("expected an array of structures, found {}", json_kind(other)),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
