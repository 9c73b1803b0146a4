/// Booking operations on a session.
///
/// A booking is identified by `(roomname, date, time)` and carries the
/// requester's name and contact details instead of a reference to Users.

use crate::core::db::connection::Connection;
use crate::core::db::mapper::{Field, Record, RecordMapper};
use crate::core::Result;
use rusqlite::{params, OptionalExtension, Transaction};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const BOOKING_FIELDS: &[Field] = &[
    Field::new("roomName", "roomname"),
    Field::new("date", "date"),
    Field::new("time", "time"),
    Field::new("firstName", "firstname"),
    Field::new("lastName", "lastname"),
    Field::new("email", "email"),
    Field::new("contactNumber", "contactnumber"),
];

pub const BOOKINGS: RecordMapper = RecordMapper::new("Bookings", BOOKING_FIELDS);

/// Identity of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingKey {
    pub roomname: String,
    pub date: String,
    pub time: String,
}

impl BookingKey {
    pub fn new(roomname: &str, date: &str, time: &str) -> Self {
        BookingKey {
            roomname: roomname.to_string(),
            date: date.to_string(),
            time: time.to_string(),
        }
    }
}

/// Contact details of whoever made the booking.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Requester {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub contactnumber: Option<String>,
}

/// A booking to create.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewBooking {
    pub roomname: String,
    pub date: String,
    pub time: String,
    #[serde(flatten)]
    pub requester: Requester,
}

impl NewBooking {
    pub fn key(&self) -> BookingKey {
        BookingKey::new(&self.roomname, &self.date, &self.time)
    }
}

fn room_exists(tx: &Transaction, roomname: &str) -> rusqlite::Result<bool> {
    let found: Option<i64> = tx
        .query_row(
            "SELECT roomID FROM Rooms WHERE roomName = ?1",
            [roomname],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn booking_exists(tx: &Transaction, key: &BookingKey) -> rusqlite::Result<bool> {
    let found: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM Bookings WHERE roomName = ?1 AND date = ?2 AND time = ?3",
            params![key.roomname, key.date, key.time],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

impl Connection {
    /// Bookings ordered by date and time, optionally restricted to one room.
    ///
    /// An unknown room yields an empty vector.
    pub fn get_bookings(&self, roomname: Option<&str>) -> Result<Vec<Record>> {
        let conn = self.raw()?;
        let bookings = match roomname {
            Some(roomname) => {
                BOOKINGS.query(conn, "WHERE roomName = ?1 ORDER BY date, time", [roomname])?
            }
            None => BOOKINGS.query(conn, "ORDER BY date, time", [])?,
        };
        debug!("Fetched {} booking(s) for room {:?}", bookings.len(), roomname);
        Ok(bookings)
    }

    /// Bookings made with the email address of `username`.
    ///
    /// # Returns
    ///
    /// `None` if the user does not exist.
    pub fn get_user_bookings(&self, username: &str) -> Result<Option<Vec<Record>>> {
        let conn = self.raw()?;
        let email: Option<Option<String>> = conn
            .query_row(
                "SELECT email FROM Users WHERE username = ?1",
                [username],
                |row| row.get(0),
            )
            .optional()?;
        let Some(email) = email else {
            return Ok(None);
        };
        let Some(email) = email else {
            return Ok(Some(Vec::new()));
        };

        let bookings = BOOKINGS.query(conn, "WHERE email = ?1 ORDER BY date, time", [email])?;
        Ok(Some(bookings))
    }

    /// Books a room.
    ///
    /// # Returns
    ///
    /// The key of the new booking, or `None` if the room does not exist or
    /// the slot is already taken.
    pub fn add_booking(&mut self, booking: &NewBooking) -> Result<Option<BookingKey>> {
        let key = booking.key();
        self.write_transaction(|tx| {
            if !room_exists(tx, &key.roomname)? {
                warn!("Cannot book unknown room {}", key.roomname);
                return Ok(None);
            }
            if booking_exists(tx, &key)? {
                warn!(
                    "Room {} is already booked on {} at {}",
                    key.roomname, key.date, key.time
                );
                return Ok(None);
            }

            let requester = &booking.requester;
            tx.execute(
                "INSERT INTO Bookings (roomName, date, time, firstName, lastName, email, contactNumber)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    key.roomname,
                    key.date,
                    key.time,
                    requester.firstname,
                    requester.lastname,
                    requester.email,
                    requester.contactnumber,
                ],
            )?;
            debug!("Added booking {:?}", key);
            Ok(Some(key))
        })
    }

    /// Replaces the requester details of an existing booking.
    ///
    /// # Returns
    ///
    /// The booking key, or `None` if no booking matches it.
    pub fn modify_booking(
        &mut self,
        roomname: &str,
        date: &str,
        time: &str,
        requester: &Requester,
    ) -> Result<Option<BookingKey>> {
        let key = BookingKey::new(roomname, date, time);
        self.write_transaction(|tx| {
            let updated = tx.execute(
                "UPDATE Bookings SET firstName = ?1, lastName = ?2, email = ?3, contactNumber = ?4
                 WHERE roomName = ?5 AND date = ?6 AND time = ?7",
                params![
                    requester.firstname,
                    requester.lastname,
                    requester.email,
                    requester.contactnumber,
                    key.roomname,
                    key.date,
                    key.time,
                ],
            )?;
            if updated < 1 {
                debug!("Booking {:?} not found", key);
                return Ok(None);
            }
            debug!("Modified booking {:?}", key);
            Ok(Some(key))
        })
    }

    /// Cancels a booking.
    ///
    /// # Returns
    ///
    /// `true` if exactly one booking was removed.
    pub fn delete_booking(&mut self, roomname: &str, date: &str, time: &str) -> Result<bool> {
        let deleted = self.raw()?.execute(
            "DELETE FROM Bookings WHERE roomName = ?1 AND date = ?2 AND time = ?3",
            params![roomname, date, time],
        )?;
        debug!("Deleted {} booking(s) for {} {} {}", deleted, roomname, date, time);
        Ok(deleted == 1)
    }
}
