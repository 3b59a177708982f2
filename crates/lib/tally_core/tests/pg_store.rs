//! PostgreSQL store against a live database.
//!
//! Runs only when `DATABASE_URL` points at a scratch PostgreSQL; every test
//! works on freshly generated emails so runs do not collide.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tally_core::migrate::migrate;
use tally_core::models::auth::{Email, NewUser, User};
use tally_core::models::ledger::{AccountUpdate, NewAccount};
use tally_core::store::postgres::PgStore;
use tally_core::store::{CredentialStore, LedgerStore, StoreError};
use tally_core::uuid::uuidv7;

async fn store() -> Option<PgStore> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL store test");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("connect to PostgreSQL");
    migrate(&pool).await.expect("run migrations");
    Some(PgStore::new(pool))
}

fn fresh_email() -> Email {
    Email::parse(&format!("{}@pg.test", uuidv7().simple())).expect("email")
}

async fn owner(store: &PgStore) -> User {
    store
        .create(NewUser::local(fresh_email(), "hash".into()))
        .await
        .expect("create owner")
}

fn wallet(name: &str) -> NewAccount {
    NewAccount {
        name: name.into(),
        currency: "EUR".into(),
        description: "pocket money".into(),
        balance: 10.0,
    }
}

#[tokio::test]
async fn concurrent_duplicate_creates_yield_one_user() {
    let Some(store) = store().await else { return };
    let store = Arc::new(store);
    let email = fresh_email();

    let mut handles = Vec::new();
    for _ in 0..6 {
        let store = Arc::clone(&store);
        let email = email.clone();
        handles.push(tokio::spawn(async move {
            store.create(NewUser::local(email, "hash".into())).await
        }));
    }

    let mut created = 0;
    for h in handles {
        match h.await.expect("join") {
            Ok(_) => created += 1,
            Err(e) => assert!(matches!(e, StoreError::DuplicateKey(_)), "{e:?}"),
        }
    }
    assert_eq!(created, 1);
    assert!(store.find_by_email(&email).await.expect("find").is_some());
}

#[tokio::test]
async fn account_quota_holds_under_concurrency() {
    let Some(store) = store().await else { return };
    let store = Arc::new(store);
    let user = owner(&store).await;

    let mut handles = Vec::new();
    for i in 0..6 {
        let store = Arc::clone(&store);
        let owner_id = user.id.clone();
        handles.push(tokio::spawn(async move {
            store
                .create_account(&owner_id, wallet(&format!("a{i}")), 3)
                .await
        }));
    }

    let mut created = 0;
    for h in handles {
        match h.await.expect("join") {
            Ok(_) => created += 1,
            Err(e) => assert!(matches!(e, StoreError::LimitReached(3)), "{e:?}"),
        }
    }
    assert_eq!(created, 3);
    assert_eq!(store.list_accounts(&user.id).await.expect("list").len(), 3);
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let Some(store) = store().await else { return };
    let user = owner(&store).await;
    let account = store
        .create_account(&user.id, wallet("Wallet"), 10)
        .await
        .expect("create account");

    let updated = store
        .update_account(
            &user.id,
            &account.id,
            AccountUpdate {
                balance: Some(42.0),
                ..Default::default()
            },
        )
        .await
        .expect("update")
        .expect("account exists");
    assert_eq!(updated.balance, 42.0);
    assert_eq!(updated.name, "Wallet");
    assert_eq!(updated.currency, "EUR");
    assert_eq!(updated.description, "pocket money");

    let stranger = owner(&store).await;
    assert!(
        store
            .update_account(&stranger.id, &account.id, AccountUpdate::default())
            .await
            .expect("update")
            .is_none()
    );
}

#[tokio::test]
async fn non_uuid_ids_find_nothing() {
    let Some(store) = store().await else { return };
    let user = owner(&store).await;

    assert!(store.find_by_id("not-a-uuid").await.expect("find").is_none());
    assert!(
        store
            .find_account(&user.id, "not-a-uuid")
            .await
            .expect("find")
            .is_none()
    );
    assert!(
        !store
            .delete_account(&user.id, "not-a-uuid")
            .await
            .expect("delete")
    );
    assert!(
        store
            .link_federated_subject("not-a-uuid", "sub")
            .await
            .expect("link")
            .is_none()
    );
}
