// Public entities for the SmartBand API
// These are the shapes that cross the HTTP boundary and appear in the OpenAPI document.

// Error and message bodies
pub mod common;

// Patients
pub mod patient;

// Vitals readings
pub mod vitals;

// Accounts and sessions
pub mod auth;
