/// Schema Module
///
/// DDL for the three relations of the booking store and a loader for SQL
/// data dumps. The store is normally created and seeded out of band; these
/// helpers are what that setup step runs.

use crate::core::Result;
use rusqlite::Connection;
use tracing::{debug, info};

/// Tables every Tellus store contains.
pub const TABLES: [&str; 3] = ["Users", "Rooms", "Bookings"];

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS Users (
    userID INTEGER PRIMARY KEY AUTOINCREMENT,
    isAdmin INTEGER NOT NULL DEFAULT 0,
    username TEXT NOT NULL UNIQUE,
    password TEXT,
    firstName TEXT,
    lastName TEXT,
    email TEXT,
    contactNumber TEXT
);

CREATE TABLE IF NOT EXISTS Rooms (
    roomID INTEGER PRIMARY KEY AUTOINCREMENT,
    roomName TEXT NOT NULL UNIQUE,
    picture TEXT,
    resources TEXT
);

CREATE TABLE IF NOT EXISTS Bookings (
    roomName TEXT NOT NULL,
    date TEXT NOT NULL,
    time TEXT NOT NULL,
    firstName TEXT,
    lastName TEXT,
    email TEXT,
    contactNumber TEXT,
    PRIMARY KEY (roomName, date, time),
    FOREIGN KEY (roomName) REFERENCES Rooms (roomName)
        ON UPDATE CASCADE ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_bookings_email ON Bookings (email);
"#;

/// Creates the Users, Rooms and Bookings tables if they do not exist yet.
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    debug!("Schema ensured for tables {:?}", TABLES);
    Ok(())
}

/// Executes a SQL dump (a sequence of statements) in one transaction.
///
/// A failing statement rolls the whole dump back.
pub fn load_dump(conn: &mut Connection, sql: &str) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(sql)?;
    tx.commit()?;
    info!("Loaded data dump ({} bytes)", sql.len());
    Ok(())
}

/// Returns true if all three relations exist in the store.
pub fn has_schema(conn: &Connection) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    for table in TABLES {
        let count: i64 = stmt.query_row([table], |row| row.get(0))?;
        if count == 0 {
            return Ok(false);
        }
    }
    Ok(true)
}
