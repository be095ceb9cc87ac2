use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, EngineError, EntryRef, TransactionKind};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_user() -> (Engine, DatabaseConnection, String) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let user_id = engine
        .register_user("Alice", "alice@example.com", "password")
        .await
        .unwrap();
    (engine, db, user_id)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
}

#[tokio::test]
async fn new_user_has_empty_ledger() {
    let (engine, _db, user) = engine_with_user().await;

    assert!(engine.entries(&user).await.unwrap().is_empty());
}

#[tokio::test]
async fn coffee_round_trip() {
    let (engine, _db, user) = engine_with_user().await;

    let entries = engine.add_entry(&user, 500, today()).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].value(), 500);
    assert_eq!(entries[0].date, today());
    assert!(entries[0].transactions().is_empty());

    let entries = engine
        .add_transaction(&user, EntryRef::Index(0), TransactionKind::Remove, "coffee", 50)
        .await
        .unwrap();
    assert_eq!(entries[0].value(), 450);
    let tx = &entries[0].transactions()[0];
    assert_eq!(
        (tx.id, tx.kind, tx.label.as_str(), tx.cost),
        (1, TransactionKind::Remove, "coffee", 50)
    );

    let entries = engine
        .delete_transaction(&user, EntryRef::Index(0), 1)
        .await
        .unwrap();
    assert_eq!(entries[0].value(), 500);
    assert!(entries[0].transactions().is_empty());

    assert_eq!(engine.entries(&user).await.unwrap(), entries);
}

#[tokio::test]
async fn transactions_survive_reload() {
    let (engine, _db, user) = engine_with_user().await;

    engine.add_entry(&user, 100, today()).await.unwrap();
    engine
        .add_transaction(&user, EntryRef::Index(0), TransactionKind::Add, "refund", 20)
        .await
        .unwrap();
    engine
        .add_transaction(&user, EntryRef::Index(0), TransactionKind::Remove, "books", 30)
        .await
        .unwrap();

    let entries = engine.entries(&user).await.unwrap();
    let ids: Vec<i64> = entries[0].transactions().iter().map(|tx| tx.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(entries[0].value(), 90);
    assert_eq!(entries[0].opening_value(), 100);
}

#[tokio::test]
async fn ids_are_not_reused_after_reload() {
    let (engine, _db, user) = engine_with_user().await;

    engine.add_entry(&user, 100, today()).await.unwrap();
    for label in ["a", "b"] {
        engine
            .add_transaction(&user, EntryRef::Index(0), TransactionKind::Add, label, 1)
            .await
            .unwrap();
    }
    engine
        .delete_transaction(&user, EntryRef::Index(0), 2)
        .await
        .unwrap();

    let entries = engine
        .add_transaction(&user, EntryRef::Index(0), TransactionKind::Add, "c", 1)
        .await
        .unwrap();
    let ids: Vec<i64> = entries[0].transactions().iter().map(|tx| tx.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn entry_order_is_kept() {
    let (engine, _db, user) = engine_with_user().await;

    for value in [30, 10, 20] {
        engine.add_entry(&user, value, today()).await.unwrap();
    }
    let entries = engine.delete_entry(&user, EntryRef::Index(1)).await.unwrap();
    let values: Vec<i64> = entries.iter().map(|e| e.value()).collect();
    assert_eq!(values, vec![30, 20]);

    let reloaded: Vec<i64> = engine
        .entries(&user)
        .await
        .unwrap()
        .iter()
        .map(|e| e.value())
        .collect();
    assert_eq!(reloaded, values);
}

#[tokio::test]
async fn deleting_entry_drops_its_transactions() {
    let (engine, _db, user) = engine_with_user().await;

    engine.add_entry(&user, 100, today()).await.unwrap();
    engine.add_entry(&user, 200, today()).await.unwrap();
    engine
        .add_transaction(&user, EntryRef::Index(0), TransactionKind::Remove, "rent", 80)
        .await
        .unwrap();

    let entries = engine.delete_entry(&user, EntryRef::Index(0)).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].value(), 200);
    assert!(entries[0].transactions().is_empty());
}

#[tokio::test]
async fn invalid_index_leaves_store_unchanged() {
    let (engine, _db, user) = engine_with_user().await;

    engine.add_entry(&user, 100, today()).await.unwrap();
    let before = engine.load_ledger(&user).await.unwrap();

    let err = engine
        .delete_entry(&user, EntryRef::Index(5))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidIndex(_)));

    let err = engine
        .add_transaction(&user, EntryRef::Index(-1), TransactionKind::Add, "x", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidIndex(_)));

    let err = engine
        .delete_transaction(&user, EntryRef::Index(1), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidIndex(_)));

    assert_eq!(engine.load_ledger(&user).await.unwrap(), before);
}

#[tokio::test]
async fn missing_things_are_not_found() {
    let (engine, _db, user) = engine_with_user().await;
    let ghost = Uuid::new_v4().to_string();

    assert!(matches!(
        engine.entries(&ghost).await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        engine.add_entry(&ghost, 10, today()).await,
        Err(EngineError::NotFound(_))
    ));

    engine.add_entry(&user, 10, today()).await.unwrap();
    assert!(matches!(
        engine.delete_transaction(&user, EntryRef::Index(0), 1).await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        engine
            .delete_entry(&user, EntryRef::Id(Uuid::new_v4()))
            .await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn invalid_amounts_are_rejected() {
    let (engine, _db, user) = engine_with_user().await;

    assert!(matches!(
        engine.add_entry(&user, 0, today()).await,
        Err(EngineError::InvalidInput(_))
    ));
    engine.add_entry(&user, 10, today()).await.unwrap();
    assert!(matches!(
        engine
            .add_transaction(&user, EntryRef::Index(0), TransactionKind::Add, "", 5)
            .await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine
            .add_transaction(&user, EntryRef::Index(0), TransactionKind::Add, "tip", -5)
            .await,
        Err(EngineError::InvalidInput(_))
    ));
    assert_eq!(engine.entries(&user).await.unwrap()[0].value(), 10);
}

#[tokio::test]
async fn entries_are_addressable_by_id() {
    let (engine, _db, user) = engine_with_user().await;

    engine.add_entry(&user, 10, today()).await.unwrap();
    let entries = engine.add_entry(&user, 20, today()).await.unwrap();
    let second = entries[1].id;

    engine
        .delete_entry(&user, EntryRef::Index(0))
        .await
        .unwrap();
    let entries = engine
        .add_transaction(&user, EntryRef::Id(second), TransactionKind::Add, "bonus", 5)
        .await
        .unwrap();
    assert_eq!(entries[0].id, second);
    assert_eq!(entries[0].value(), 25);

    let entries = engine
        .delete_transaction(&user, EntryRef::Id(second), 1)
        .await
        .unwrap();
    assert_eq!(entries[0].value(), 20);
}

#[tokio::test]
async fn ledgers_are_per_user() {
    let (engine, _db, alice) = engine_with_user().await;
    let bob = engine
        .register_user("Bob", "bob@example.com", "password")
        .await
        .unwrap();

    engine.add_entry(&alice, 10, today()).await.unwrap();
    engine.add_entry(&bob, 99, today()).await.unwrap();

    assert_eq!(engine.entries(&alice).await.unwrap()[0].value(), 10);
    assert_eq!(engine.entries(&bob).await.unwrap()[0].value(), 99);
}

#[tokio::test]
async fn stale_save_is_rejected() {
    let (engine, _db, user) = engine_with_user().await;

    let mut first = engine.load_ledger(&user).await.unwrap();
    let mut second = engine.load_ledger(&user).await.unwrap();
    assert_eq!(first.version(), second.version());

    first.add_entry(10, today()).unwrap();
    engine.save_ledger(&user, &mut first).await.unwrap();
    assert_eq!(first.version(), second.version() + 1);

    second.add_entry(20, today()).unwrap();
    let err = engine.save_ledger(&user, &mut second).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let values: Vec<i64> = engine
        .entries(&user)
        .await
        .unwrap()
        .iter()
        .map(|e| e.value())
        .collect();
    assert_eq!(values, vec![10]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_do_not_lose_updates() {
    let (engine, _db, user) = engine_with_user().await;
    let engine = Arc::new(engine);
    engine.add_entry(&user, 1_000, today()).await.unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for n in 0..16 {
        let engine = Arc::clone(&engine);
        let user = user.clone();
        tasks.spawn(async move {
            engine
                .add_transaction(
                    &user,
                    EntryRef::Index(0),
                    TransactionKind::Remove,
                    &format!("item {n}"),
                    10,
                )
                .await
        });
    }
    while let Some(res) = tasks.join_next().await {
        res.unwrap().unwrap();
    }

    let entries = engine.entries(&user).await.unwrap();
    let mut ids: Vec<i64> = entries[0].transactions().iter().map(|tx| tx.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=16).collect::<Vec<_>>());
    assert_eq!(entries[0].value(), 1_000 - 16 * 10);
}
