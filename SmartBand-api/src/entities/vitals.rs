use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use smart_band_domain::entities::vitals::{VitalsRecord as DomainVitalsRecord, VitalsUpdate};

/// One stored vitals reading
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VitalsRecord {
    pub id: i64,
    #[schema(example = 7)]
    pub patient_id: i64,
    #[schema(example = "2026-10-16T08:30:00.000Z")]
    pub timestamp: String,
    #[schema(example = 80)]
    pub heart_rate: Option<i64>,
    #[schema(example = 97)]
    pub spo2: Option<i64>,
    #[schema(example = 36.6)]
    pub temperature: Option<f64>,
}

impl From<DomainVitalsRecord> for VitalsRecord {
    fn from(record: DomainVitalsRecord) -> Self {
        Self {
            id: record.id,
            patient_id: record.patient_id,
            timestamp: record.timestamp,
            heart_rate: record.heart_rate,
            spo2: record.spo2,
            temperature: record.temperature,
        }
    }
}

/// Body of `PUT /edit_vitals/{id}`.
///
/// Any subset of the vital signs. Numbers may also be sent as numeric
/// strings. Omitted fields are carried over from the latest reading.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VitalsUpdateRequest {
    #[serde(default)]
    #[schema(value_type = Option<i64>, example = 80)]
    pub heart_rate: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<i64>, example = 97)]
    pub spo2: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<f64>, example = 36.6)]
    pub temperature: Option<Value>,
}

impl From<VitalsUpdateRequest> for VitalsUpdate {
    fn from(request: VitalsUpdateRequest) -> Self {
        Self {
            heart_rate: request.heart_rate,
            spo2: request.spo2,
            temperature: request.temperature,
        }
    }
}

/// Body of `POST /add_vitals`, as sent by sensor gateways
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AddVitalsRequest {
    #[serde(default)]
    #[schema(value_type = i64, example = 7)]
    pub patient_id: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub heart_rate: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub spo2: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub temperature: Option<Value>,
}

impl AddVitalsRequest {
    /// Split into the target patient and the update to merge
    pub fn into_parts(self) -> (Option<Value>, VitalsUpdate) {
        let update = VitalsUpdate {
            heart_rate: self.heart_rate,
            spo2: self.spo2,
            temperature: self.temperature,
        };
        (self.patient_id, update)
    }
}

/// Query parameters for `GET /patient/{id}/vitals`
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct RecentVitalsQuery {
    /// Number of readings to return (default: 5). Zero is rejected with a
    /// 400; values above 100 return 100 readings.
    pub limit: Option<usize>,
}
