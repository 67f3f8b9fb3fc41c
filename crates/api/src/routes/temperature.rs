//! Temperature Routes
//!
//! There is no hardware behind this endpoint: a reading is drawn uniformly
//! from [`MIN_TEMPERATURE`, `MAX_TEMPERATURE`] and stored on the sensor.

use axum::{
    extract::{rejection::QueryRejection, Query},
    Json,
};
use rand::Rng;
use serde::Deserialize;
use storage::Sensor;
use tracing::info;

use crate::error::ApiError;
use crate::session::DbSession;

/// Lower bound of a simulated reading (°C)
pub const MIN_TEMPERATURE: f64 = 18.0;
/// Upper bound of a simulated reading (°C)
pub const MAX_TEMPERATURE: f64 = 25.0;

/// Query parameters for the temperature endpoint
#[derive(Debug, Deserialize)]
pub struct TemperatureQuery {
    pub location: String,
    /// Narrow the lookup to one sensor at the location; 0 means unset
    #[serde(rename = "sensorID")]
    pub sensor_id: Option<i64>,
}

impl TemperatureQuery {
    /// Sensor id to filter on, if any
    pub fn sensor_filter(&self) -> Option<i64> {
        self.sensor_id.filter(|id| *id != 0)
    }
}

/// Draw a reading rounded to two decimals
pub fn simulate_temperature<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let raw = rng.gen_range(MIN_TEMPERATURE..=MAX_TEMPERATURE);
    (raw * 100.0).round() / 100.0
}

/// Simulate a reading for a sensor at a location
pub async fn read_temperature(
    DbSession(mut session): DbSession,
    params: Result<Query<TemperatureQuery>, QueryRejection>,
) -> Result<Json<Sensor>, ApiError> {
    let Query(params) = params?;
    let value = simulate_temperature(&mut rand::thread_rng());

    let sensor = session
        .record_reading(&params.location, params.sensor_filter(), value)
        .await?;

    info!("Sensor {} at {} read {}", sensor.id, sensor.location, value);
    Ok(Json(sensor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_simulated_range_and_precision() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            let value = simulate_temperature(&mut rng);
            assert!((MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&value));
            assert_eq!((value * 100.0).round() / 100.0, value);
        }
    }

    #[test]
    fn test_query_sensor_id_is_optional() {
        let params: TemperatureQuery =
            serde_json::from_str(r#"{"location":"Lab1"}"#).unwrap();
        assert_eq!(params.location, "Lab1");
        assert_eq!(params.sensor_id, None);

        let params: TemperatureQuery =
            serde_json::from_str(r#"{"location":"Lab1","sensorID":3}"#).unwrap();
        assert_eq!(params.sensor_id, Some(3));
        assert_eq!(params.sensor_filter(), Some(3));
    }

    #[test]
    fn test_zero_sensor_id_is_unset() {
        let params: TemperatureQuery =
            serde_json::from_str(r#"{"location":"Lab1","sensorID":0}"#).unwrap();
        assert_eq!(params.sensor_filter(), None);
    }
}
