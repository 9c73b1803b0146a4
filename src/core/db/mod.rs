/// Database Module
///
/// The data-access layer of Tellus, organized into focused submodules.
///
/// ## Architecture
///
/// - **Engine** (`engine.rs`): connection factory holding the store configuration
/// - **Session** (`connection.rs`): one live connection, its pragmas, transactions and close
/// - **Mapping** (`mapper.rs`): table-driven conversion of rows into records
/// - **Schema** (`schema.rs`): DDL of the Users, Rooms and Bookings relations and dump loading
/// - **Entities** (`users.rs`, `rooms.rs`, `bookings.rs`): CRUD operations on the session
///
/// ## Error Handling
///
/// Store failures surface as `TellusError::Database`. Missing entities and
/// uniqueness conflicts are returned as `None` or `false`.
pub mod bookings;
pub mod connection;
pub mod engine;
pub mod mapper;
pub mod rooms;
pub mod schema;
pub mod users;

pub use bookings::{BookingKey, NewBooking, Requester};
pub use connection::Connection;
pub use engine::{Engine, EngineConfig, DEFAULT_DB_PATH};
pub use mapper::{Field, Record, RecordMapper};
pub use rooms::RoomFields;
pub use users::UserFields;
