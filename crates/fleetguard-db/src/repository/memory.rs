//! Process-local stores for the demo profile and tests.
//!
//! Cloning a store shares its contents.

use std::collections::HashMap;
use std::sync::Arc;

use fleetguard_core::error::{FleetError, FleetResult};
use fleetguard_core::models::account::{Account, NewAccount};
use fleetguard_core::models::login_attempt::{LoginAttempt, NewLoginAttempt};
use fleetguard_core::repository::{
    AccountRepository, LoginHistoryRepository, PaginatedResult, Pagination,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::account::hash_password;

/// Accounts keyed by username.
#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    pepper: Option<String>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pepper(pepper: String) -> Self {
        Self {
            accounts: Arc::default(),
            pepper: Some(pepper),
        }
    }

    /// Store `account` as-is, bypassing hashing. Used for accounts whose
    /// `password_hash` is already in the verifier's format.
    pub async fn insert(&self, account: Account) -> FleetResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.username) {
            return Err(FleetError::AlreadyExists {
                entity: format!("account {}", account.username),
            });
        }
        accounts.insert(account.username.clone(), account.clone());
        Ok(account)
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, input: NewAccount) -> FleetResult<Account> {
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
        let mut account = Account::new(input.username, password_hash, input.roles);
        account.enabled = input.enabled;
        self.insert(account).await
    }

    async fn find_by_username(&self, username: &str) -> FleetResult<Option<Account>> {
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn save(&self, account: Account) -> FleetResult<Account> {
        let mut accounts = self.accounts.write().await;
        // A rename would otherwise leave the old key behind.
        accounts.retain(|_, existing| existing.id != account.id);
        accounts.insert(account.username.clone(), account.clone());
        Ok(account)
    }
}

/// Append-only history held in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryLoginHistoryRepository {
    entries: Arc<RwLock<Vec<LoginAttempt>>>,
}

impl InMemoryLoginHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry, oldest first.
    pub async fn all(&self) -> Vec<LoginAttempt> {
        self.entries.read().await.clone()
    }
}

impl LoginHistoryRepository for InMemoryLoginHistoryRepository {
    async fn append(&self, input: NewLoginAttempt) -> FleetResult<LoginAttempt> {
        let attempt = LoginAttempt {
            id: Uuid::new_v4(),
            account_id: input.account_id,
            username: input.username,
            ip_address: input.ip_address,
            success: input.success,
            timestamp: input.timestamp,
        };
        self.entries.write().await.push(attempt.clone());
        Ok(attempt)
    }

    async fn list_for_username(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> FleetResult<PaginatedResult<LoginAttempt>> {
        let entries = self.entries.read().await;
        let mut matching: Vec<&LoginAttempt> =
            entries.iter().filter(|a| a.username == username).collect();
        // Stable sort keeps later appends first among equal timestamps.
        matching.reverse();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(pagination.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(pagination.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
