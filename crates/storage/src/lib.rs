//! Storage Layer
//!
//! SQLite persistence for sensor records. Callers open a [`Session`] per unit
//! of work; the underlying connection goes back to the pool when it drops.

mod database;
mod models;
mod repository;

pub use database::{Database, DatabaseConfig};
pub use models::{Sensor, SensorInput, SensorValueUpdate};
pub use repository::Session;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Record not found")]
    NotFound,
}
