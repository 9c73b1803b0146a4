/// Session Module
///
/// A `Connection` wraps one live SQLite handle for the duration of a unit of
/// work. It owns foreign key enforcement, the transaction helper used by the
/// lookup-then-write operations, and deterministic release of the handle.
///
/// The entity operations live in `users.rs`, `rooms.rs` and `bookings.rs` as
/// further `impl Connection` blocks.

use crate::core::db::engine::EngineConfig;
use crate::core::db::schema;
use crate::core::{Result, TellusError};
use rusqlite::{Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// A session on a Tellus store.
///
/// Obtain one through `Engine::connect`. A session is either open or
/// closed; every operation except `close` fails with `TellusError::Closed`
/// once the handle has been released. Dropping an open session closes it.
#[derive(Debug)]
pub struct Connection {
    conn: Option<rusqlite::Connection>,
    path: PathBuf,
}

impl Connection {
    pub(crate) fn open(config: &EngineConfig) -> Result<Self> {
        let conn = rusqlite::Connection::open(&config.db_path)?;
        conn.busy_timeout(config.busy_timeout)?;
        // Bundled SQLite enforces foreign keys by default, so set it both ways
        conn.pragma_update(None, "foreign_keys", config.foreign_keys)?;
        debug!("Opened session on {}", config.db_path.display());

        Ok(Connection {
            conn: Some(conn),
            path: config.db_path.clone(),
        })
    }

    /// Path of the store this session is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// The underlying SQLite handle, for statements the session API does
    /// not cover.
    pub fn raw(&self) -> Result<&rusqlite::Connection> {
        self.conn.as_ref().ok_or(TellusError::Closed)
    }

    fn raw_mut(&mut self) -> Result<&mut rusqlite::Connection> {
        self.conn.as_mut().ok_or(TellusError::Closed)
    }

    /// Runs `f` inside a `BEGIN IMMEDIATE` transaction and commits if it
    /// returns `Ok`. The write lock is taken up front, so no other writer can
    /// change the rows `f` reads before it writes. An error rolls back.
    pub(crate) fn write_transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction) -> Result<T>,
    {
        let conn = self.raw_mut()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    /// Turns referential integrity checks on.
    ///
    /// # Returns
    ///
    /// `true` if the pragma was applied, `false` otherwise.
    pub fn enable_foreign_keys(&self) -> bool {
        self.set_foreign_keys(true)
    }

    /// Turns referential integrity checks off.
    pub fn disable_foreign_keys(&self) -> bool {
        self.set_foreign_keys(false)
    }

    fn set_foreign_keys(&self, on: bool) -> bool {
        let value = if on { "ON" } else { "OFF" };
        let result = self
            .raw()
            .and_then(|conn| Ok(conn.pragma_update(None, "foreign_keys", value)?));
        match result {
            Ok(()) => {
                debug!("PRAGMA foreign_keys = {}", value);
                true
            }
            Err(e) => {
                error!("Failed to set foreign_keys = {}: {}", value, e);
                false
            }
        }
    }

    /// Reads back whether foreign keys are enforced.
    ///
    /// # Errors
    ///
    /// On a store failure the session is closed before the error is
    /// returned; it must not be used afterwards.
    pub fn check_foreign_keys_status(&mut self) -> Result<bool> {
        let result = self
            .raw()?
            .query_row("PRAGMA foreign_keys", [], |row| row.get::<_, i64>(0));
        match result {
            Ok(value) => {
                let enabled = value == 1;
                debug!("Foreign keys status: {}", if enabled { "ON" } else { "OFF" });
                Ok(enabled)
            }
            Err(e) => {
                error!("Failed to read foreign_keys pragma: {}", e);
                if let Err(close_err) = self.close() {
                    error!("Failed to close session after pragma error: {}", close_err);
                }
                Err(e.into())
            }
        }
    }

    /// Creates the store's tables if they are missing.
    pub fn create_schema(&self) -> Result<()> {
        schema::create_schema(self.raw()?)
    }

    /// Returns true if the Users, Rooms and Bookings tables all exist.
    pub fn has_schema(&self) -> Result<bool> {
        schema::has_schema(self.raw()?)
    }

    /// Executes a SQL data dump in one transaction.
    pub fn load_dump(&mut self, sql: &str) -> Result<()> {
        schema::load_dump(self.raw_mut()?, sql)
    }

    /// Commits anything pending and releases the handle.
    ///
    /// Calling `close` on a session that is already closed does nothing.
    pub fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            if !conn.is_autocommit() {
                conn.execute_batch("COMMIT")?;
            }
            conn.close().map_err(|(_, e)| TellusError::Database(e))?;
            debug!("Closed session on {}", self.path.display());
        }
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("Failed to close session on {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::Engine;
    use crate::test_utils::DatabaseFixture;

    #[test]
    fn test_foreign_keys_toggle() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let mut session = fixture.connect();

        assert!(session.check_foreign_keys_status().unwrap());
        assert!(session.disable_foreign_keys());
        assert!(!session.check_foreign_keys_status().unwrap());
        assert!(session.enable_foreign_keys());
        assert!(session.check_foreign_keys_status().unwrap());
        session.close().unwrap();
    }

    #[test]
    fn test_foreign_keys_off_by_config() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let mut config = fixture.engine.config().clone();
        config.foreign_keys = false;
        let mut session = Engine::new(config).connect().unwrap();

        assert!(!session.check_foreign_keys_status().unwrap());

        session
            .raw()
            .unwrap()
            .execute(
                "INSERT INTO Bookings (roomName, date, time) VALUES ('Vodka', '20170401', '1000')",
                [],
            )
            .unwrap();
        assert_eq!(session.get_bookings(Some("Vodka")).unwrap().len(), 1);
    }

    #[test]
    fn test_foreign_keys_on_by_config_rejects_orphans() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let mut session = fixture.connect();

        assert!(session.check_foreign_keys_status().unwrap());
        let result = session.raw().unwrap().execute(
            "INSERT INTO Bookings (roomName, date, time) VALUES ('Vodka', '20170401', '1000')",
            [],
        );
        let err: TellusError = result.unwrap_err().into();
        assert!(err.is_foreign_key_violation());
    }

    #[test]
    fn test_close_is_idempotent() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let mut session = fixture.connect();

        session.close().unwrap();
        session.close().unwrap();
        assert!(!session.is_open());
    }

    #[test]
    fn test_operations_after_close_fail() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let mut session = fixture.connect();
        session.close().unwrap();

        assert!(matches!(session.get_rooms(), Err(TellusError::Closed)));
        assert!(matches!(session.delete_user("para"), Err(TellusError::Closed)));
        assert!(matches!(
            session.check_foreign_keys_status(),
            Err(TellusError::Closed)
        ));
        assert!(!session.enable_foreign_keys());
    }

    #[test]
    fn test_close_commits_open_transaction() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let mut session = fixture.connect();
        session
            .raw()
            .unwrap()
            .execute_batch("BEGIN; INSERT INTO Rooms (roomName) VALUES ('Attic');")
            .unwrap();
        session.close().unwrap();

        let mut reopened = fixture.connect();
        assert!(reopened.get_room("Attic").unwrap().is_some());
        reopened.close().unwrap();
    }

    #[test]
    fn test_write_transaction_rolls_back_on_error() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let mut session = fixture.connect();

        let result: Result<()> = session.write_transaction(|tx| {
            tx.execute("INSERT INTO Rooms (roomName) VALUES ('Attic')", [])?;
            Err(TellusError::Restricted("abort".to_string()))
        });
        assert!(result.is_err());
        assert!(session.get_room("Attic").unwrap().is_none());
    }

    #[test]
    fn test_drop_releases_handle() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        {
            let session = fixture.connect();
            session
                .raw()
                .unwrap()
                .execute_batch("BEGIN; INSERT INTO Rooms (roomName) VALUES ('Cellar');")
                .unwrap();
        }

        let mut session = fixture.connect();
        assert!(session.get_room("Cellar").unwrap().is_some());
        session.close().unwrap();
    }
}
