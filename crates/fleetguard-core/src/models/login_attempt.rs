//! Login history domain model (append-only).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginAttempt {
    pub id: Uuid,
    /// Weak reference to the account; `None` when the username did not
    /// resolve.
    pub account_id: Option<Uuid>,
    /// Sanitized username as supplied by the client.
    pub username: String,
    pub ip_address: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLoginAttempt {
    pub account_id: Option<Uuid>,
    pub username: String,
    pub ip_address: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}
