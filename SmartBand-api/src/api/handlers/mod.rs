pub mod auth;
pub mod health;
pub mod patients;
pub mod qr;
pub mod vitals;

// Re-export handlers for easier imports
pub use health::{health_check, index};
