//! Account domain model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A principal able to log in.
///
/// `failed_attempts` and `locked_at` carry the lockout state; see
/// `fleetguard_auth::lockout` for the transitions between them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    /// Unique, case-sensitive login name. Never changes after creation.
    pub username: String,
    pub password_hash: String,
    pub enabled: bool,
    pub failed_attempts: u32,
    /// Set when the account crossed the failure threshold.
    pub locked_at: Option<DateTime<Utc>>,
    pub roles: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Build a fresh, unlocked account around an already-hashed password.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        roles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: password_hash.into(),
            enabled: true,
            failed_attempts: 0,
            locked_at: None,
            roles: roles.into_iter().map(Into::into).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Provisioning input. The store hashes `password` before persisting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
    pub enabled: bool,
    pub roles: BTreeSet<String>,
}

impl NewAccount {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        roles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            enabled: true,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}
