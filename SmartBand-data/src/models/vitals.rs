use serde::{Deserialize, Serialize};

/// Storage model for one row of the append-only vitals table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsRecord {
    /// Row identifier, breaks ties between equal timestamps
    pub id: i64,

    /// Patient the reading belongs to
    pub patient_id: i64,

    /// RFC 3339 UTC timestamp assigned by the store at insert time
    pub timestamp: String,

    /// Heart rate in beats per minute
    pub heart_rate: Option<i64>,

    /// Oxygen saturation in percent
    pub spo2: Option<i64>,

    /// Body temperature in degrees Celsius
    pub temperature: Option<f64>,
}

/// A reading to append. The store assigns `id` and `timestamp`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewVitalsRecord {
    pub patient_id: i64,
    pub heart_rate: Option<i64>,
    pub spo2: Option<i64>,
    pub temperature: Option<f64>,
}
