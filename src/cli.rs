/// Command Line Module
///
/// Argument parsing and command execution for the `tellus` operator tool.
/// Commands open one session each, print JSON on success and leave the
/// session closed on every path.

use crate::core::db::Engine;
use crate::core::Result;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tellus",
    version,
    about = "Inspect and seed a Tellus room-booking store."
)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the SQLite store, overriding the configuration.
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Create the tables, then optionally load a SQL dump.
    Init {
        #[arg(value_name = "DUMP.sql")]
        dump: Option<PathBuf>,
    },
    /// List users as JSON.
    Users,
    /// List rooms as JSON.
    Rooms,
    /// List bookings as JSON, optionally for one room.
    Bookings {
        #[arg(value_name = "ROOM")]
        room: Option<String>,
    },
    /// Print whether foreign keys are enforced.
    FkStatus,
}

/// Executes `command` against the engine's store and returns what to print.
pub fn run(engine: &Engine, command: &Command) -> Result<String> {
    match command {
        Command::Init { dump } => {
            if let Some(parent) = engine.db_path().parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let created = engine.initialize()?;
            if let Some(dump) = dump {
                let sql = fs::read_to_string(dump)?;
                engine.load_dump(&sql)?;
                info!("Loaded {} into {}", dump.display(), engine.db_path().display());
            }
            let verb = if created { "Initialized" } else { "Already initialized" };
            Ok(format!("{} {}", verb, engine.db_path().display()))
        }
        Command::Users => {
            let mut session = engine.connect()?;
            let users = session.get_users()?;
            session.close()?;
            Ok(serde_json::to_string_pretty(&users)?)
        }
        Command::Rooms => {
            let mut session = engine.connect()?;
            let rooms = session.get_rooms()?;
            session.close()?;
            Ok(serde_json::to_string_pretty(&rooms)?)
        }
        Command::Bookings { room } => {
            let mut session = engine.connect()?;
            let bookings = session.get_bookings(room.as_deref())?;
            session.close()?;
            Ok(serde_json::to_string_pretty(&bookings)?)
        }
        Command::FkStatus => {
            let mut session = engine.connect()?;
            let enabled = session.check_foreign_keys_status()?;
            session.close()?;
            Ok(if enabled { "ON" } else { "OFF" }.to_string())
        }
    }
}

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the configured filter; "info" is the fallback.
pub fn init_logging(configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
