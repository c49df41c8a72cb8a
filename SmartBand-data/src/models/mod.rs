// Storage models
pub mod patient;
pub mod user;
pub mod vitals;
