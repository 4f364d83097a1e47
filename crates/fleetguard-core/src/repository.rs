//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations live in
//! `fleetguard-db` (SurrealDB and in-memory).

use crate::error::FleetResult;
use crate::models::{
    account::{Account, NewAccount},
    login_attempt::{LoginAttempt, NewLoginAttempt},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Credential store
// ---------------------------------------------------------------------------

pub trait AccountRepository: Send + Sync {
    /// Hash the password and persist a new, unlocked account.
    fn create(&self, input: NewAccount) -> impl Future<Output = FleetResult<Account>> + Send;
    /// Look up by exact (case-sensitive) username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = FleetResult<Option<Account>>> + Send;
    /// Persist the full account state, last write wins.
    fn save(&self, account: Account) -> impl Future<Output = FleetResult<Account>> + Send;
}

// ---------------------------------------------------------------------------
// Login history (append-only)
// ---------------------------------------------------------------------------

pub trait LoginHistoryRepository: Send + Sync {
    /// Append a new attempt. No update or delete operations exist.
    fn append(
        &self,
        input: NewLoginAttempt,
    ) -> impl Future<Output = FleetResult<LoginAttempt>> + Send;
    /// Attempts recorded under `username`, newest first.
    fn list_for_username(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> impl Future<Output = FleetResult<PaginatedResult<LoginAttempt>>> + Send;
}
