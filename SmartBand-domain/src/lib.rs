// SmartBand Domain
// This crate contains the business logic for the SmartBand patient monitoring backend

// Services that implement business logic
pub mod services;

// Authentication
pub mod auth;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the database module from the data crate for convenience
pub use smart_band_data::database;
