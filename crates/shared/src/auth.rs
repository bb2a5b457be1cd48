//! Authentication payloads shared between the API and its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::AccountId;

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated account.
    pub account: AccountSummary,
    /// Opaque bearer token.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Public identity of an account.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
}
