// Core infrastructure modules
pub mod core;

// Front-end modules
pub mod cli;
pub mod config;

#[cfg(test)]
mod test_utils;

pub use crate::core::db::{
    BookingKey, Connection, Engine, EngineConfig, NewBooking, Record, Requester, RoomFields,
    UserFields,
};
pub use crate::core::{Result, TellusError};
