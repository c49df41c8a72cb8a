use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Domain model for one stored vitals reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsRecord {
    pub id: i64,
    pub patient_id: i64,

    /// RFC 3339 UTC timestamp assigned at insert time
    pub timestamp: String,

    /// Beats per minute
    pub heart_rate: Option<i64>,

    /// Oxygen saturation, percent
    pub spo2: Option<i64>,

    /// Degrees Celsius
    pub temperature: Option<f64>,
}

/// A partial vitals update exactly as the caller sent it.
///
/// Each value is kept as raw JSON so that numeric strings from sensor
/// gateways can be coerced before merging. JSON `null` and an absent key
/// both deserialize to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalsUpdate {
    #[serde(default)]
    pub heart_rate: Option<Value>,

    #[serde(default)]
    pub spo2: Option<Value>,

    #[serde(default)]
    pub temperature: Option<Value>,
}

impl VitalsUpdate {
    /// True when no vital sign was supplied
    pub fn is_empty(&self) -> bool {
        self.heart_rate.is_none() && self.spo2.is_none() && self.temperature.is_none()
    }
}

/// A vitals update after coercion to typed values
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VitalsReading {
    pub heart_rate: Option<i64>,
    pub spo2: Option<i64>,
    pub temperature: Option<f64>,
}

/// A merged reading ready to be appended to a patient's history
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NewVitals {
    pub patient_id: i64,
    pub heart_rate: Option<i64>,
    pub spo2: Option<i64>,
    pub temperature: Option<f64>,
}
