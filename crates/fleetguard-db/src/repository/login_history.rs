//! SurrealDB implementation of [`LoginHistoryRepository`].

use chrono::{DateTime, Utc};
use fleetguard_core::error::FleetResult;
use fleetguard_core::models::login_attempt::{LoginAttempt, NewLoginAttempt};
use fleetguard_core::repository::{LoginHistoryRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct LoginAttemptRow {
    record_id: String,
    account_id: Option<String>,
    username: String,
    ip_address: String,
    success: bool,
    timestamp: DateTime<Utc>,
}

impl LoginAttemptRow {
    fn try_into_attempt(self) -> Result<LoginAttempt, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let account_id = self
            .account_id
            .map(|raw| Uuid::parse_str(&raw))
            .transpose()
            .map_err(|e| DbError::Decode(format!("invalid account UUID: {e}")))?;
        Ok(LoginAttempt {
            id,
            account_id,
            username: self.username,
            ip_address: self.ip_address,
            success: self.success,
            timestamp: self.timestamp,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the login history store.
#[derive(Clone)]
pub struct SurrealLoginHistoryRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLoginHistoryRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LoginHistoryRepository for SurrealLoginHistoryRepository<C> {
    async fn append(&self, input: NewLoginAttempt) -> FleetResult<LoginAttempt> {
        let id = Uuid::new_v4();

        self.db
            .query(
                "CREATE type::record('login_history', $id) SET \
                 account_id = $account_id, \
                 username = $username, \
                 ip_address = $ip_address, \
                 success = $success, \
                 timestamp = $timestamp",
            )
            .bind(("id", id.to_string()))
            .bind(("account_id", input.account_id.map(|a| a.to_string())))
            .bind(("username", input.username.clone()))
            .bind(("ip_address", input.ip_address.clone()))
            .bind(("success", input.success))
            .bind(("timestamp", input.timestamp))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(LoginAttempt {
            id,
            account_id: input.account_id,
            username: input.username,
            ip_address: input.ip_address,
            success: input.success,
            timestamp: input.timestamp,
        })
    }

    async fn list_for_username(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> FleetResult<PaginatedResult<LoginAttempt>> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM login_history \
                 WHERE username = $username GROUP ALL",
            )
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM login_history \
                 WHERE username = $username \
                 ORDER BY timestamp DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("username", username.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LoginAttemptRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(LoginAttemptRow::try_into_attempt)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
