//! Integration tests for the SurrealDB credential store.

use chrono::{TimeZone, Utc};
use fleetguard_core::error::FleetError;
use fleetguard_core::models::account::NewAccount;
use fleetguard_core::repository::AccountRepository;
use fleetguard_db::SurrealAccountRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetguard_db::run_migrations(&db).await.unwrap();
    db
}

#[tokio::test]
async fn create_and_find_account() {
    let repo = SurrealAccountRepository::new(setup().await);

    let account = repo
        .create(NewAccount::new("admin", "admin123", ["ADMIN"]))
        .await
        .unwrap();
    assert_eq!(account.username, "admin");
    assert_eq!(account.failed_attempts, 0);
    assert!(account.locked_at.is_none());
    assert!(account.enabled);
    assert!(account.has_role("ADMIN"));
    assert!(account.password_hash.starts_with("$argon2id$"));
    assert_ne!(account.password_hash, "admin123");

    let found = repo.find_by_username("admin").await.unwrap().unwrap();
    assert_eq!(found.id, account.id);
    assert_eq!(found.roles, account.roles);
}

#[tokio::test]
async fn usernames_are_case_sensitive() {
    let repo = SurrealAccountRepository::new(setup().await);
    repo.create(NewAccount::new("admin", "admin123", ["ADMIN"]))
        .await
        .unwrap();

    assert!(repo.find_by_username("Admin").await.unwrap().is_none());
    assert!(repo.find_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_rejected() {
    let repo = SurrealAccountRepository::new(setup().await);
    repo.create(NewAccount::new("operador", "op123", ["USER"]))
        .await
        .unwrap();

    let err = repo
        .create(NewAccount::new("operador", "other", ["USER"]))
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::AlreadyExists { .. }));
}

#[tokio::test]
async fn save_persists_lockout_state() {
    let repo = SurrealAccountRepository::new(setup().await);
    let mut account = repo
        .create(NewAccount::new("operador", "op123", ["USER"]))
        .await
        .unwrap();

    let locked_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    account.failed_attempts = 3;
    account.locked_at = Some(locked_at);
    account.updated_at = locked_at;
    repo.save(account.clone()).await.unwrap();

    let loaded = repo.find_by_username("operador").await.unwrap().unwrap();
    assert_eq!(loaded.failed_attempts, 3);
    assert_eq!(loaded.locked_at, Some(locked_at));

    // Clearing the lock writes NONE back.
    let mut cleared = loaded;
    cleared.failed_attempts = 0;
    cleared.locked_at = None;
    repo.save(cleared).await.unwrap();

    let loaded = repo.find_by_username("operador").await.unwrap().unwrap();
    assert_eq!(loaded.failed_attempts, 0);
    assert!(loaded.locked_at.is_none());
    assert_eq!(loaded.id, account.id);
}

#[tokio::test]
async fn disabled_accounts_round_trip() {
    let repo = SurrealAccountRepository::new(setup().await);
    let mut input = NewAccount::new("retired", "pw", ["USER"]);
    input.enabled = false;

    repo.create(input).await.unwrap();
    let loaded = repo.find_by_username("retired").await.unwrap().unwrap();
    assert!(!loaded.enabled);
}

#[tokio::test]
async fn peppered_hash_differs_from_plain_password() {
    let repo = SurrealAccountRepository::with_pepper(setup().await, "pepper".into());
    let account = repo
        .create(NewAccount::new("admin", "admin123", ["ADMIN"]))
        .await
        .unwrap();
    assert!(account.password_hash.starts_with("$argon2id$"));
}
