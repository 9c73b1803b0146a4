/// Core Module for Tellus
///
/// Shared infrastructure of the booking backend: the SQLite data-access
/// layer and the error type every operation reports through.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{Result, TellusError};
