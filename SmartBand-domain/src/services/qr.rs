use std::io::Cursor;

use async_trait::async_trait;
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use tracing::{error, info};

use smart_band_data::repository::PatientRepositoryTrait;

use crate::services::errors::ServiceError;

/// Pixel size of one QR module
const MODULE_PIXELS: u32 = 10;

/// Trait for QR code generation
#[async_trait]
pub trait QrServiceTrait: Send + Sync {
    /// PNG encoding the patient's page URL
    async fn generate_patient_qr(&self, patient_id: i64) -> Result<Vec<u8>, ServiceError>;
}

/// Generates QR codes that point a scanner at a patient's record
pub struct QrService<R: PatientRepositoryTrait> {
    patients: R,
    base_url: String,
}

impl<R: PatientRepositoryTrait> QrService<R> {
    /// Create a new QR service. `base_url` is the public origin of the API.
    pub fn new(patients: R, base_url: impl Into<String>) -> Self {
        Self {
            patients,
            base_url: base_url.into(),
        }
    }

    /// URL encoded into a patient's QR code
    pub fn patient_url(&self, patient_id: i64) -> String {
        format!("{}/patient/{}", self.base_url.trim_end_matches('/'), patient_id)
    }
}

/// Render `data` as a QR code PNG with a quiet zone
pub fn render_qr_png(data: &str) -> Result<Vec<u8>, ServiceError> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| {
        error!("Failed to encode QR payload: {}", e);
        ServiceError::Unhandled(format!("Failed to encode QR code: {}", e))
    })?;

    let image = code.render::<Luma<u8>>()
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).map_err(|e| {
        error!("Failed to write QR PNG: {}", e);
        ServiceError::Unhandled(format!("Failed to render QR code: {}", e))
    })?;

    Ok(png)
}

#[async_trait]
impl<R: PatientRepositoryTrait> QrServiceTrait for QrService<R> {
    async fn generate_patient_qr(&self, patient_id: i64) -> Result<Vec<u8>, ServiceError> {
        if self.patients.get(patient_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Patient {} not found", patient_id)));
        }

        let url = self.patient_url(patient_id);
        let png = render_qr_png(&url)?;
        info!("Generated QR code for {}", url);

        Ok(png)
    }
}
