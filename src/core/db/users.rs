/// User operations on a session.

use crate::core::db::connection::Connection;
use crate::core::db::mapper::{Field, Record, RecordMapper};
use crate::core::Result;
use rusqlite::{params, OptionalExtension};
use serde::Deserialize;
use tracing::{debug, warn};

const USER_FIELDS: &[Field] = &[
    Field::new("userID", "userid"),
    Field::new("isAdmin", "accounttype"),
    Field::new("username", "username"),
    Field::new("firstName", "firstname"),
    Field::new("lastName", "lastname"),
    Field::new("email", "email"),
    Field::new("contactNumber", "contactnumber"),
];

/// Maps Users rows. The password column is never exposed.
pub const USERS: RecordMapper = RecordMapper::new("Users", USER_FIELDS);

/// Profile of a user to register. Missing fields are stored as NULL, the
/// admin flag defaults to 0.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserFields {
    pub isadmin: i64,
    pub password: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub contactnumber: Option<String>,
}

impl Connection {
    /// Registers a user.
    ///
    /// # Returns
    ///
    /// `Some(username)` if the user was created, `None` if the username is
    /// already taken. The lookup and insert share one transaction.
    pub fn add_user(&mut self, username: &str, fields: &UserFields) -> Result<Option<String>> {
        self.write_transaction(|tx| {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT userID FROM Users WHERE username = ?1",
                    [username],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                warn!("User {} already exists", username);
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO Users (isAdmin, username, password, firstName, lastName, email, contactNumber)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    fields.isadmin,
                    username,
                    fields.password,
                    fields.firstname,
                    fields.lastname,
                    fields.email,
                    fields.contactnumber,
                ],
            )?;
            debug!("Added user {} with id {}", username, tx.last_insert_rowid());
            Ok(Some(username.to_string()))
        })
    }

    /// Removes every row with the given username.
    ///
    /// # Returns
    ///
    /// `true` if at least one row was deleted.
    pub fn delete_user(&mut self, username: &str) -> Result<bool> {
        let deleted = self
            .raw()?
            .execute("DELETE FROM Users WHERE username = ?1", [username])?;
        debug!("Deleted {} row(s) for user {}", deleted, username);
        Ok(deleted > 0)
    }

    pub fn get_user(&self, username: &str) -> Result<Option<Record>> {
        let sql = format!("{} WHERE username = ?1", USERS.select());
        let user = self
            .raw()?
            .query_row(&sql, [username], |row| USERS.map_row(row))
            .optional()?;
        Ok(user)
    }

    /// All users ordered by id.
    pub fn get_users(&self) -> Result<Vec<Record>> {
        Ok(USERS.query(self.raw()?, "ORDER BY userID", [])?)
    }
}
