// Domain entities and value objects
pub mod conversions;
pub mod patient;
pub mod user;
pub mod vitals;

// Re-export common types for easier imports
pub use patient::{CreatePatientRequest, Patient, PatientStatus, UpdatePatientRequest};
pub use user::{LoginRequest, SignupRequest, User};
pub use vitals::{NewVitals, VitalsReading, VitalsRecord, VitalsUpdate};
