//! Sensor Routes

use axum::{
    extract::{rejection::PathRejection, Path},
    http::StatusCode,
    Json,
};
use storage::{Sensor, SensorInput, SensorValueUpdate};
use tracing::info;

use crate::error::ApiError;
use crate::session::DbSession;

/// List all sensors
pub async fn list_sensors(
    DbSession(mut session): DbSession,
) -> Result<Json<Vec<Sensor>>, ApiError> {
    Ok(Json(session.list_sensors().await?))
}

/// Get one sensor
pub async fn get_sensor(
    DbSession(mut session): DbSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Sensor>, ApiError> {
    let Path(id) = id?;
    Ok(Json(session.get_sensor(id).await?))
}

/// Create a sensor
pub async fn create_sensor(
    DbSession(mut session): DbSession,
    Json(input): Json<SensorInput>,
) -> Result<Json<Sensor>, ApiError> {
    let sensor = session.create_sensor(&input).await?;
    info!("Created sensor {} ({}) at {}", sensor.id, sensor.kind, sensor.location);
    Ok(Json(sensor))
}

/// Replace a sensor's descriptive fields
pub async fn replace_sensor(
    DbSession(mut session): DbSession,
    id: Result<Path<i64>, PathRejection>,
    Json(input): Json<SensorInput>,
) -> Result<Json<Sensor>, ApiError> {
    let Path(id) = id?;
    Ok(Json(session.replace_sensor(id, &input).await?))
}

/// Set a sensor's value and status
pub async fn update_sensor_value(
    DbSession(mut session): DbSession,
    id: Result<Path<i64>, PathRejection>,
    Json(update): Json<SensorValueUpdate>,
) -> Result<Json<Sensor>, ApiError> {
    let Path(id) = id?;
    Ok(Json(session.update_value(id, &update).await?))
}

/// Delete a sensor
pub async fn delete_sensor(
    DbSession(mut session): DbSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    session.delete_sensor(id).await?;
    info!("Deleted sensor {}", id);
    Ok(StatusCode::NO_CONTENT)
}
