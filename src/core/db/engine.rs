/// Storage Engine Module
///
/// The engine is a connection factory: it holds the store configuration and
/// opens a fresh `Connection` session on every call to `connect`.

use crate::core::db::connection::Connection;
use crate::core::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Store location used when no path is configured.
pub const DEFAULT_DB_PATH: &str = "database/tellus.db";

/// Settings applied to every session the engine opens.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Path to the SQLite file, or ":memory:"
    pub db_path: PathBuf,
    /// Whether sessions start with `PRAGMA foreign_keys = ON`
    pub foreign_keys: bool,
    /// How long a session waits on a locked store before failing
    pub busy_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            foreign_keys: true,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

impl EngineConfig {
    /// Default settings pointing at `path`.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        EngineConfig {
            db_path: path.as_ref().to_path_buf(),
            ..EngineConfig::default()
        }
    }
}

/// Connection factory for a Tellus store.
///
/// # Examples
///
/// ```no_run
/// use tellus::core::db::{Engine, EngineConfig};
///
/// let engine = Engine::new(EngineConfig::with_path("database/tellus.db"));
/// let mut session = engine.connect()?;
/// let rooms = session.get_rooms()?;
/// session.close()?;
/// # Ok::<(), tellus::core::TellusError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn db_path(&self) -> &Path {
        &self.config.db_path
    }

    /// Opens a new session on the configured store.
    ///
    /// # Errors
    ///
    /// Returns `TellusError::Database` if SQLite cannot open the file. There
    /// is no retry.
    pub fn connect(&self) -> Result<Connection> {
        Connection::open(&self.config)
    }

    /// Creates the Users, Rooms and Bookings tables if they are missing.
    ///
    /// # Returns
    ///
    /// `true` if the schema was created, `false` if the store already had
    /// all three tables.
    pub fn initialize(&self) -> Result<bool> {
        let mut session = self.connect()?;
        let created = if session.has_schema()? {
            debug!("Store at {} already has its tables", self.config.db_path.display());
            false
        } else {
            session.create_schema()?;
            info!("Initialized store at {}", self.config.db_path.display());
            true
        };
        session.close()?;
        Ok(created)
    }

    /// Loads a SQL data dump into the store in a single transaction.
    pub fn load_dump(&self, sql: &str) -> Result<()> {
        let mut session = self.connect()?;
        session.load_dump(sql)?;
        session.close()
    }
}
