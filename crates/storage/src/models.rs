//! Sensor row and request shapes

use serde::{Deserialize, Serialize};

/// A row of the `sensors` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sensor {
    pub id: i64,
    pub name: String,
    /// Sensor category, e.g. "thermometer"
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub location: String,
    pub unit: Option<String>,
    /// Last reading, null until one is recorded
    pub value: Option<f64>,
    pub status: Option<String>,
}

/// Fields accepted on create and on full replace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Body of a value patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorValueUpdate {
    pub value: f64,
    pub status: String,
}
