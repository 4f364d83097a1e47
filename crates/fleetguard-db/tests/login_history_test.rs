//! Integration tests for the SurrealDB login history.

use chrono::{Duration, TimeZone, Utc};
use fleetguard_core::models::login_attempt::NewLoginAttempt;
use fleetguard_core::repository::{LoginHistoryRepository, Pagination};
use fleetguard_db::SurrealLoginHistoryRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetguard_db::run_migrations(&db).await.unwrap();
    db
}

fn attempt(username: &str, account_id: Option<Uuid>, success: bool, minute: i64) -> NewLoginAttempt {
    NewLoginAttempt {
        account_id,
        username: username.into(),
        ip_address: "192.168.1.10".into(),
        success,
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + Duration::minutes(minute),
    }
}

#[tokio::test]
async fn append_and_list_newest_first() {
    let repo = SurrealLoginHistoryRepository::new(setup().await);
    let account_id = Uuid::new_v4();

    for minute in 0..3 {
        repo.append(attempt("admin", Some(account_id), false, minute))
            .await
            .unwrap();
    }
    repo.append(attempt("admin", Some(account_id), true, 3))
        .await
        .unwrap();

    let page = repo
        .list_for_username("admin", Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 4);
    assert!(page.items[0].success);
    assert!(page.items.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    assert!(page.items.iter().all(|a| a.account_id == Some(account_id)));
}

#[tokio::test]
async fn unknown_usernames_are_recorded_without_account() {
    let repo = SurrealLoginHistoryRepository::new(setup().await);
    let stored = repo
        .append(attempt("ghost", None, false, 0))
        .await
        .unwrap();
    assert!(stored.account_id.is_none());

    let page = repo
        .list_for_username("ghost", Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, stored.id);
    assert_eq!(page.items[0].ip_address, "192.168.1.10");
}

#[tokio::test]
async fn pagination_and_isolation() {
    let repo = SurrealLoginHistoryRepository::new(setup().await);
    for minute in 0..5 {
        repo.append(attempt("operador", None, false, minute))
            .await
            .unwrap();
    }
    repo.append(attempt("admin", None, true, 9)).await.unwrap();

    let page = repo
        .list_for_username("operador", Pagination { offset: 2, limit: 2 })
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].timestamp, attempt("operador", None, false, 2).timestamp);

    let empty = repo
        .list_for_username("nobody", Pagination::default())
        .await
        .unwrap();
    assert_eq!(empty.total, 0);
    assert!(empty.items.is_empty());
}
