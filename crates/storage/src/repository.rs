//! Sensor Repository
//!
//! Every operation runs on the single connection held by a [`Session`].

use sqlx::pool::PoolConnection;
use sqlx::Sqlite;
use tracing::debug;

use crate::{Sensor, SensorInput, SensorValueUpdate, StorageError};

/// One checked-out database connection.
///
/// Dropping the session returns the connection to the pool, on success and on
/// error alike.
pub struct Session {
    conn: PoolConnection<Sqlite>,
}

impl Session {
    pub(crate) fn new(conn: PoolConnection<Sqlite>) -> Self {
        Self { conn }
    }

    /// Get all sensors in id order
    pub async fn list_sensors(&mut self) -> Result<Vec<Sensor>, StorageError> {
        let sensors = sqlx::query_as::<_, Sensor>("SELECT * FROM sensors ORDER BY id")
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(sensors)
    }

    /// Get a sensor by primary key
    pub async fn get_sensor(&mut self, id: i64) -> Result<Sensor, StorageError> {
        sqlx::query_as::<_, Sensor>("SELECT * FROM sensors WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Insert a sensor; storage assigns the id, value and status start empty
    pub async fn create_sensor(&mut self, input: &SensorInput) -> Result<Sensor, StorageError> {
        let sensor = sqlx::query_as::<_, Sensor>(
            r#"INSERT INTO sensors (name, "type", location, unit)
               VALUES (?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(&input.name)
        .bind(&input.kind)
        .bind(&input.location)
        .bind(&input.unit)
        .fetch_one(&mut *self.conn)
        .await?;

        debug!("Created sensor {} at {}", sensor.id, sensor.location);
        Ok(sensor)
    }

    /// Overwrite name, type, location and unit. Value and status are kept.
    pub async fn replace_sensor(
        &mut self,
        id: i64,
        input: &SensorInput,
    ) -> Result<Sensor, StorageError> {
        let sensor = sqlx::query_as::<_, Sensor>(
            r#"UPDATE sensors
               SET name = ?, "type" = ?, location = ?, unit = ?
               WHERE id = ?
               RETURNING *"#,
        )
        .bind(&input.name)
        .bind(&input.kind)
        .bind(&input.location)
        .bind(&input.unit)
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        debug!("Replaced sensor {}", id);
        Ok(sensor)
    }

    /// Overwrite value and status only
    pub async fn update_value(
        &mut self,
        id: i64,
        update: &SensorValueUpdate,
    ) -> Result<Sensor, StorageError> {
        let sensor = sqlx::query_as::<_, Sensor>(
            "UPDATE sensors SET value = ?, status = ? WHERE id = ? RETURNING *",
        )
        .bind(update.value)
        .bind(&update.status)
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        debug!("Sensor {} value set to {} ({})", id, update.value, update.status);
        Ok(sensor)
    }

    /// Remove a sensor
    pub async fn delete_sensor(&mut self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM sensors WHERE id = ?")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        debug!("Deleted sensor {}", id);
        Ok(())
    }

    /// Store `value` on the first sensor at `location`, narrowed to
    /// `sensor_id` when one is given. Status is left as is.
    ///
    /// Lookup and write are a single statement so overlapping readings only
    /// ever wait on SQLite's write lock.
    pub async fn record_reading(
        &mut self,
        location: &str,
        sensor_id: Option<i64>,
        value: f64,
    ) -> Result<Sensor, StorageError> {
        let sensor = sqlx::query_as::<_, Sensor>(
            r#"UPDATE sensors
               SET value = ?
               WHERE id = (
                   SELECT id FROM sensors
                   WHERE location = ? AND (? IS NULL OR id = ?)
                   ORDER BY id
                   LIMIT 1
               )
               RETURNING *"#,
        )
        .bind(value)
        .bind(location)
        .bind(sensor_id)
        .bind(sensor_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        debug!("Recorded reading {} for sensor {} at {}", value, sensor.id, location);
        Ok(sensor)
    }
}
