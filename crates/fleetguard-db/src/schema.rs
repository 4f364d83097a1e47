//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. Account UUIDs are used as record keys and
//! stored as strings wherever they appear as references.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

/// Bookkeeping table: one row per applied schema version.
const SCHEMA_VERSION_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS schema_version SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE schema_version TYPE int;
DEFINE FIELD IF NOT EXISTS label ON TABLE schema_version TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE schema_version TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_schema_version ON TABLE schema_version \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct AppliedRow {
    version: u32,
}

/// `(version, label, ddl)`, strictly increasing by version.
const STEPS: &[(u32, &str, &str)] = &[(1, "accounts_and_login_history", SCHEMA_V1)];

// -----------------------------------------------------------------------
// Schema v1: accounts and login history
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- Credential store
DEFINE TABLE account SCHEMAFULL;
DEFINE FIELD username ON TABLE account TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD password_hash ON TABLE account TYPE string;
DEFINE FIELD enabled ON TABLE account TYPE bool DEFAULT true;
DEFINE FIELD failed_attempts ON TABLE account TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
DEFINE FIELD locked_at ON TABLE account TYPE option<datetime>;
DEFINE FIELD roles ON TABLE account TYPE array DEFAULT [];
DEFINE FIELD roles.* ON TABLE account TYPE string;
DEFINE FIELD created_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_account_username ON TABLE account \
    COLUMNS username UNIQUE;

-- Login history, append-only
DEFINE TABLE login_history SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD account_id ON TABLE login_history TYPE option<string>;
DEFINE FIELD username ON TABLE login_history TYPE string;
DEFINE FIELD ip_address ON TABLE login_history TYPE string;
DEFINE FIELD success ON TABLE login_history TYPE bool;
DEFINE FIELD timestamp ON TABLE login_history TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_login_history_username_time ON TABLE login_history \
    COLUMNS username, timestamp;
DEFINE INDEX idx_login_history_account ON TABLE login_history \
    COLUMNS account_id;
";

/// Bring the schema up to the latest version.
///
/// Each pending step runs in its own transaction together with the
/// `schema_version` row that marks it applied, so a failed step leaves
/// nothing behind and is retried on the next start.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(SCHEMA_VERSION_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(format!("schema_version table: {e}")))?;

    let current = applied_version(db).await?;
    for &(version, label, ddl) in STEPS.iter().filter(|(v, _, _)| *v > current) {
        info!(version, label, "Applying schema step");

        let statement = format!(
            "BEGIN TRANSACTION;\n{ddl}\n\
             CREATE schema_version SET version = $version, label = $label;\n\
             COMMIT TRANSACTION;"
        );
        db.query(statement)
            .bind(("version", version))
            .bind(("label", label))
            .await?
            .check()
            .map_err(|e| DbError::Migration(format!("step {version} ({label}): {e}")))?;
    }

    Ok(())
}

/// Highest applied schema version, 0 on a fresh database.
pub async fn applied_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut response = db
        .query("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
        .await?;
    let rows: Vec<AppliedRow> = response.take(0)?;
    Ok(rows.into_iter().map(|r| r.version).max().unwrap_or(0))
}

/// Version the schema ends up at after [`run_migrations`].
pub fn latest_version() -> u32 {
    STEPS.iter().map(|(v, _, _)| *v).max().unwrap_or(0)
}

/// Raw DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_defines_both_stores() {
        assert!(SCHEMA_V1.contains("DEFINE TABLE account"));
        assert!(SCHEMA_V1.contains("DEFINE TABLE login_history"));
        assert!(SCHEMA_V1.contains("COLUMNS username UNIQUE"));
    }

    #[test]
    fn history_is_append_only() {
        assert!(SCHEMA_V1.contains("FOR update NONE"));
        assert!(SCHEMA_V1.contains("FOR delete NONE"));
    }

    #[test]
    fn steps_are_strictly_increasing() {
        assert!(STEPS.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(latest_version(), 1);
    }
}
