/// Room operations on a session.

use crate::core::db::connection::Connection;
use crate::core::db::mapper::{Field, Record, RecordMapper};
use crate::core::{Result, TellusError};
use rusqlite::{params, OptionalExtension};
use serde::Deserialize;
use tracing::{debug, warn};

const ROOM_FIELDS: &[Field] = &[
    Field::new("roomID", "roomid"),
    Field::new("roomName", "roomname"),
    Field::new("picture", "picture"),
    Field::new("resources", "resources"),
];

pub const ROOMS: RecordMapper = RecordMapper::new("Rooms", ROOM_FIELDS);

/// Editable attributes of a room. Missing values are stored as NULL.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoomFields {
    pub picture: Option<String>,
    pub resources: Option<String>,
}

impl Connection {
    /// All rooms ordered by id. An empty store yields an empty vector.
    pub fn get_rooms(&self) -> Result<Vec<Record>> {
        Ok(ROOMS.query(self.raw()?, "ORDER BY roomID", [])?)
    }

    pub fn get_room(&self, roomname: &str) -> Result<Option<Record>> {
        let sql = format!("{} WHERE roomName = ?1", ROOMS.select());
        let room = self
            .raw()?
            .query_row(&sql, [roomname], |row| ROOMS.map_row(row))
            .optional()?;
        Ok(room)
    }

    /// Creates a room.
    ///
    /// # Returns
    ///
    /// `Some(roomname)` on success, `None` if a room with that name exists.
    pub fn add_room(&mut self, roomname: &str, fields: &RoomFields) -> Result<Option<String>> {
        self.write_transaction(|tx| {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT roomID FROM Rooms WHERE roomName = ?1",
                    [roomname],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                warn!("Room {} already exists", roomname);
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO Rooms (roomName, picture, resources) VALUES (?1, ?2, ?3)",
                params![roomname, fields.picture, fields.resources],
            )?;
            debug!("Added room {} with id {}", roomname, tx.last_insert_rowid());
            Ok(Some(roomname.to_string()))
        })
    }

    /// Replaces the picture and resources of a room.
    ///
    /// # Returns
    ///
    /// `Some(roomname)` if a row was updated, `None` if no room has that
    /// name.
    pub fn modify_room(&mut self, roomname: &str, fields: &RoomFields) -> Result<Option<String>> {
        self.write_transaction(|tx| {
            let room_id: Option<i64> = tx
                .query_row(
                    "SELECT roomID FROM Rooms WHERE roomName = ?1",
                    [roomname],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(room_id) = room_id else {
                debug!("Room {} not found", roomname);
                return Ok(None);
            };

            let updated = tx.execute(
                "UPDATE Rooms SET picture = ?1, resources = ?2 WHERE roomID = ?3",
                params![fields.picture, fields.resources, room_id],
            )?;
            if updated < 1 {
                return Ok(None);
            }
            debug!("Modified room {}", roomname);
            Ok(Some(roomname.to_string()))
        })
    }

    /// Deletes a room.
    ///
    /// # Returns
    ///
    /// `true` if the room was removed, `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// `TellusError::Restricted` if foreign keys are enforced and bookings
    /// still reference the room.
    pub fn delete_room(&mut self, roomname: &str) -> Result<bool> {
        let result = self
            .raw()?
            .execute("DELETE FROM Rooms WHERE roomName = ?1", [roomname])
            .map_err(TellusError::from);
        match result {
            Ok(deleted) => {
                debug!("Deleted {} row(s) for room {}", deleted, roomname);
                Ok(deleted > 0)
            }
            Err(e) if e.is_foreign_key_violation() => {
                warn!("Room {} still has bookings", roomname);
                Err(TellusError::Restricted(format!(
                    "room {} is referenced by existing bookings",
                    roomname
                )))
            }
            Err(e) => Err(e),
        }
    }
}
