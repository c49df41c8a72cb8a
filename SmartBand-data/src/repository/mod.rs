// Repository module structure
pub mod errors;
mod in_memory;
mod patient;
mod storage;
mod user;
mod vitals;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use in_memory::InMemoryStorage;
pub use patient::{PatientRepository, PatientRepositoryTrait};
pub use user::{UserRepository, UserRepositoryTrait};
pub use vitals::{VitalsRepository, VitalsRepositoryTrait};
