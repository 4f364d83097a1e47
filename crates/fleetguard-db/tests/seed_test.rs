//! Startup provisioning.

use fleetguard_core::repository::AccountRepository;
use fleetguard_db::seed::{DEMO_PASSWORD, DEMO_USERNAME};
use fleetguard_db::{
    InMemoryAccountRepository, SurrealAccountRepository, seed_default_accounts,
    seed_demo_account,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn default_accounts_seeded_once() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetguard_db::run_migrations(&db).await.unwrap();
    let repo = SurrealAccountRepository::new(db);

    assert_eq!(seed_default_accounts(&repo).await, 2);
    assert_eq!(seed_default_accounts(&repo).await, 0);

    let admin = repo.find_by_username("admin").await.unwrap().unwrap();
    assert!(admin.has_role("ADMIN"));
    let operador = repo.find_by_username("operador").await.unwrap().unwrap();
    assert!(operador.has_role("USER"));
    assert!(!operador.has_role("ADMIN"));
}

#[tokio::test]
async fn existing_account_is_left_alone() {
    let repo = InMemoryAccountRepository::new();
    let mut admin = fleetguard_core::models::account::Account::new("admin", "custom", ["ADMIN"]);
    admin.failed_attempts = 2;
    repo.insert(admin).await.unwrap();

    assert_eq!(seed_default_accounts(&repo).await, 1);
    let admin = repo.find_by_username("admin").await.unwrap().unwrap();
    assert_eq!(admin.password_hash, "custom");
    assert_eq!(admin.failed_attempts, 2);
}

#[tokio::test]
async fn demo_account_stores_plain_password() {
    let repo = InMemoryAccountRepository::new();
    assert!(seed_demo_account(&repo).await);
    assert!(!seed_demo_account(&repo).await);

    let demo = repo.find_by_username(DEMO_USERNAME).await.unwrap().unwrap();
    assert_eq!(demo.password_hash, DEMO_PASSWORD);
    assert!(demo.has_role("USER"));
    assert_eq!(repo.len().await, 1);
}
