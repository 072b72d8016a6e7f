//! Postgres storage tests
//!
//! Run only when TEST_DATABASE_URL points at a disposable database.

mod helpers;

use std::sync::Once;
use assert_matches::assert_matches;
use carry_bot::database::{run_migrations, PgStorage, Storage, UnitOfWork};
use carry_bot::models::user::UpsertUserRequest;
use carry_bot::services::{BalanceLedger, Debit, UserDirectory};
use carry_bot::BotError;
use helpers::*;
use serial_test::serial;
use sqlx::PgPool;

static INIT: Once = Once::new();

async fn test_storage() -> Option<PgStorage> {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });

    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return None;
    };

    let pool = PgPool::connect(&url).await.expect("Failed to connect to test database");
    run_migrations(&pool).await.expect("Failed to run migrations");
    sqlx::query("TRUNCATE users").execute(&pool).await.expect("Failed to clean users");

    Some(PgStorage::new(pool))
}

fn request(id: i64, username: &str, first_name: &str) -> UpsertUserRequest {
    UpsertUserRequest {
        id,
        chat_id: id,
        first_name: first_name.to_string(),
        last_name: None,
        username: Some(username.to_string()),
    }
}

async fn seed(storage: &PgStorage, id: i64, username: &str, bonuses: i64) {
    let mut uow = storage.begin().await.unwrap();
    uow.upsert_user(&request(id, username, "Anna")).await.unwrap();
    if bonuses > 0 {
        uow.add_bonuses(id, bonuses).await.unwrap();
    }
    uow.commit().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_upsert_preserves_balance() {
    let Some(storage) = test_storage().await else { return };
    seed(&storage, USER_ID, USER_USERNAME, 40).await;

    let mut uow = storage.begin().await.unwrap();
    UserDirectory::new(uow.as_mut())
        .upsert_user(&request(USER_ID, "anna_new", "Anna"))
        .await
        .unwrap();
    let user = UserDirectory::new(uow.as_mut()).get_by_id(USER_ID).await.unwrap();
    uow.commit().await.unwrap();

    assert_eq!(user.bonuses, 40);
    assert_eq!(user.username.as_deref(), Some("anna_new"));
}

#[tokio::test]
#[serial]
async fn test_ledger_updates_and_refusals() {
    let Some(storage) = test_storage().await else { return };
    seed(&storage, USER_ID, USER_USERNAME, 0).await;

    let mut uow = storage.begin().await.unwrap();
    let mut ledger = BalanceLedger::new(uow.as_mut());
    let change = ledger.increase(USER_ID, 50).await.unwrap();
    assert_eq!((change.previous, change.current()), (0, 50));

    assert_matches!(ledger.decrease(USER_ID, 100).await.unwrap(), Debit::Refused { balance: 50, .. });
    assert_matches!(ledger.decrease(USER_ID, 30).await.unwrap(), Debit::Applied(c) if c.current() == 20);
    assert_matches!(ledger.increase(USER_ID, 0).await, Err(BotError::InvalidAmount { amount: 0 }));
    assert_matches!(ledger.increase(7, 5).await, Err(BotError::UserNotFound { user_id: 7 }));
    uow.commit().await.unwrap();

    let mut uow = storage.begin().await.unwrap();
    assert_eq!(UserDirectory::new(uow.as_mut()).get_balance(USER_ID).await.unwrap(), 20);
    uow.commit().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_rollback_discards_balance_change() {
    let Some(storage) = test_storage().await else { return };
    seed(&storage, USER_ID, USER_USERNAME, 10).await;

    let mut uow = storage.begin().await.unwrap();
    BalanceLedger::new(uow.as_mut()).increase(USER_ID, 90).await.unwrap();
    uow.rollback().await.unwrap();

    let mut uow = storage.begin().await.unwrap();
    assert_eq!(UserDirectory::new(uow.as_mut()).get_balance(USER_ID).await.unwrap(), 10);
    uow.commit().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_username_lookup_and_listing() {
    let Some(storage) = test_storage().await else { return };
    seed(&storage, 3, "c_user", 0).await;
    seed(&storage, 1, "a_user", 0).await;
    seed(&storage, 2, "b_user", 0).await;

    let mut uow = storage.begin().await.unwrap();
    let mut directory = UserDirectory::new(uow.as_mut());

    assert_eq!(directory.get_by_username("b_user").await.unwrap().map(|u| u.id), Some(2));
    assert!(directory.get_by_username("B_USER").await.unwrap().is_none());

    let page = directory.list_users(2, 0).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_matches!(directory.list_users(0, 0).await, Err(BotError::InvalidInput(_)));
    uow.commit().await.unwrap();
}
