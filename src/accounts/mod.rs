//! User accounts: signup, credential checks, and bearer token issuance.

mod service;
pub mod tokens;

pub use service::{AccountApi, AccountService};
pub use tokens::{Claims, TokenAuthority, TokenError};

use crate::{processing::ValidationError, store::StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A registered user. Serialized field names match the user collection mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Unique key; also the document id.
    pub username: String,
    /// Stored as supplied and compared by equality at login.
    pub password: String,
    /// Optional profile age.
    #[serde(default)]
    pub age: i64,
    /// Optional profile gender.
    #[serde(default)]
    pub gender: String,
}

/// Login body.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// Account username.
    #[serde(default)]
    pub username: String,
    /// Account password.
    #[serde(default)]
    pub password: String,
}

/// Errors emitted by signup and login.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Username or password rejected before touching the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Another account already holds the username.
    #[error("User already exists: {0}")]
    UsernameTaken(String),
    /// No account matched the username and password.
    #[error("User doesn't exist or wrong password")]
    InvalidCredentials,
    /// The record store request failed.
    #[error("Failed to access accounts: {0}")]
    Store(#[from] StoreError),
    /// Token signing failed.
    #[error(transparent)]
    Token(#[from] TokenError),
}
