/// # Test Utilities Module
///
/// Fixtures for unit tests: every fixture is a fresh store in its own
/// temporary directory, so tests never share state.

use crate::core::db::{Connection, Engine, EngineConfig};
use crate::core::Result;
use tempfile::TempDir;

/// Three users (admin, onur, para), rooms Stage and Chill, one booking each.
pub const SAMPLE_DUMP: &str = include_str!("../database/tellus_data_dump.sql");

/// Isolated store fixture. The directory is removed when the fixture drops.
pub struct DatabaseFixture {
    _dir: TempDir,
    pub engine: Engine,
}

impl DatabaseFixture {
    /// A store with the schema but no rows.
    pub fn empty() -> Result<Self> {
        let dir = TempDir::new()?;
        let engine = Engine::new(EngineConfig::with_path(dir.path().join("test_tellus.db")));
        engine.initialize()?;
        Ok(DatabaseFixture { _dir: dir, engine })
    }

    /// A store loaded with `SAMPLE_DUMP`.
    pub fn with_sample_data() -> Result<Self> {
        let fixture = Self::empty()?;
        fixture.engine.load_dump(SAMPLE_DUMP)?;
        Ok(fixture)
    }

    pub fn connect(&self) -> Connection {
        self.engine
            .connect()
            .expect("Failed to open session on fixture store")
    }
}

/// Counts rows of `table` whose `column` equals `value`, bypassing the
/// session API.
pub fn count_rows(session: &Connection, table: &str, column: &str, value: &str) -> i64 {
    session
        .raw()
        .expect("Session is closed")
        .query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table, column),
            [value],
            |row| row.get(0),
        )
        .expect("Failed to count rows")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_data_fixture() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let session = fixture.connect();

        assert_eq!(session.get_users().unwrap().len(), 3);
        assert_eq!(session.get_rooms().unwrap().len(), 2);
        assert_eq!(session.get_bookings(None).unwrap().len(), 2);
    }

    #[test]
    fn test_fixtures_are_isolated() {
        let first = DatabaseFixture::with_sample_data().unwrap();
        let second = DatabaseFixture::with_sample_data().unwrap();
        assert_ne!(first.engine.db_path(), second.engine.db_path());

        let mut session = first.connect();
        session.delete_user("para").unwrap();
        assert_eq!(count_rows(&second.connect(), "Users", "username", "para"), 1);
    }
}
