use thiserror::Error;
use validator::ValidationErrors;

use smart_band_data::repository::RepositoryError;

/// Errors returned by every domain service.
///
/// The display text is the message shown to API callers.
#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// The requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Bad credentials or missing session
    #[error("{0}")]
    Unauthorized(String),

    /// The entity already exists
    #[error("{0}")]
    Conflict(String),

    /// The backing store is unreachable or misconfigured
    #[error("{0}")]
    Configuration(String),

    /// Anything else
    #[error("{0}")]
    Unhandled(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(format!("Not found: {}", msg)),
            RepositoryError::Validation(msg) => ServiceError::Validation(msg),
            RepositoryError::Conflict(msg) => ServiceError::Conflict(format!("Already exists: {}", msg)),
            RepositoryError::Database(_) | RepositoryError::Pool(_) => {
                ServiceError::Configuration(err.to_string())
            }
            _ => ServiceError::Unhandled(err.to_string()),
        }
    }
}

/// Flatten validator errors into a single readable message
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let error_msgs: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, error_msgs.join(", "))
        })
        .collect();

    // field_errors() is a HashMap
    messages.sort();
    messages.join("; ")
}
