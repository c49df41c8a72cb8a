use serde::{Deserialize, Serialize};

/// Storage model for a user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique login name
    pub username: String,

    /// Argon2id hash in PHC string format
    pub password_hash: String,

    pub email: Option<String>,
}

/// Input data for inserting a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
}
