//! FleetGuard storage: SurrealDB connection management, schema
//! migrations, and the credential and login-history stores.
//!
//! Every store implements a `fleetguard-core` repository trait. The
//! SurrealDB stores back production; the in-memory stores back the demo
//! profile and tests.

mod connection;
mod error;
pub mod repository;
mod schema;
pub mod seed;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::{
    InMemoryAccountRepository, InMemoryLoginHistoryRepository, SurrealAccountRepository,
    SurrealLoginHistoryRepository,
};
pub use schema::{applied_version, latest_version, run_migrations, schema_v1};
pub use seed::{seed_default_accounts, seed_demo_account};
