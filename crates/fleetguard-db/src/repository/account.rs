//! SurrealDB implementation of [`AccountRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use fleetguard_core::error::FleetResult;
use fleetguard_core::models::account::{Account, NewAccount};
use fleetguard_core::repository::AccountRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AccountRow {
    record_id: String,
    username: String,
    password_hash: String,
    enabled: bool,
    failed_attempts: u32,
    locked_at: Option<DateTime<Utc>>,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn try_into_account(self) -> Result<Account, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid account UUID: {e}")))?;
        Ok(Account {
            id,
            username: self.username,
            password_hash: self.password_hash,
            enabled: self.enabled,
            failed_attempts: self.failed_attempts,
            locked_at: self.locked_at,
            roles: self.roles.into_iter().collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing.
pub(crate) fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Hash(format!("argon2 params: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let input = match pepper {
        Some(p) => format!("{p}{password}"),
        None => password.to_string(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input.as_bytes(), &salt)
        .map_err(|e| DbError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

const SELECT_BY_USERNAME: &str = "SELECT meta::id(id) AS record_id, * FROM account \
     WHERE username = $username";

/// SurrealDB implementation of the credential store.
#[derive(Clone)]
pub struct SurrealAccountRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealAccountRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    async fn fetch(&self, username: &str) -> Result<Option<Account>, DbError> {
        let mut result = self
            .db
            .query(SELECT_BY_USERNAME)
            .bind(("username", username.to_string()))
            .await?;

        let rows: Vec<AccountRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(AccountRow::try_into_account)
            .transpose()
    }
}

impl<C: Connection> AccountRepository for SurrealAccountRepository<C> {
    async fn create(&self, input: NewAccount) -> FleetResult<Account> {
        if self.fetch(&input.username).await?.is_some() {
            return Err(DbError::Duplicate {
                entity: format!("account {}", input.username),
            }
            .into());
        }

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
        let mut account = Account::new(input.username, password_hash, input.roles);
        account.enabled = input.enabled;

        self.save(account).await
    }

    async fn find_by_username(&self, username: &str) -> FleetResult<Option<Account>> {
        Ok(self.fetch(username).await?)
    }

    async fn save(&self, account: Account) -> FleetResult<Account> {
        let id_str = account.id.to_string();
        let roles: Vec<String> = account.roles.into_iter().collect();

        let result = self
            .db
            .query(
                "UPSERT type::record('account', $id) SET \
                 username = $username, \
                 password_hash = $password_hash, \
                 enabled = $enabled, \
                 failed_attempts = $failed_attempts, \
                 locked_at = $locked_at, \
                 roles = $roles, \
                 created_at = $created_at, \
                 updated_at = $updated_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", account.username.clone()))
            .bind(("password_hash", account.password_hash))
            .bind(("enabled", account.enabled))
            .bind(("failed_attempts", account.failed_attempts))
            .bind(("locked_at", account.locked_at))
            .bind(("roles", roles))
            .bind(("created_at", account.created_at))
            .bind(("updated_at", account.updated_at))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let saved = self.fetch(&account.username).await?;
        Ok(saved.ok_or(DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?)
    }
}
