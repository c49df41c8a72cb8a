// Domain services
// This module contains business logic implementations.
pub mod errors;
pub mod patient;
pub mod qr;
pub mod vitals;

// Re-export service traits and implementations
pub use errors::ServiceError;
pub use patient::{PatientService, PatientServiceTrait};
pub use qr::{render_qr_png, QrService, QrServiceTrait};
pub use vitals::{merge_vitals, VitalsService, VitalsServiceTrait};
