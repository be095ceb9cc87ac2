use sea_orm::Database;

use engine::{Engine, EngineError};
use migration::MigratorTrait;

async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

#[tokio::test]
async fn register_then_login() {
    let engine = engine().await;

    let id = engine
        .register_user(" Alice ", "Alice@Example.com", "s3cret!")
        .await
        .unwrap();
    let logged = engine.login("alice@example.com", "s3cret!").await.unwrap();
    assert_eq!(id, logged);

    let user = engine.user(&id).await.unwrap();
    assert_eq!(user.name, "Alice");
    assert_eq!(user.email, "alice@example.com");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let engine = engine().await;

    engine
        .register_user("Alice", "alice@example.com", "password")
        .await
        .unwrap();
    let err = engine
        .register_user("Other", "ALICE@example.com", "password")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("alice@example.com".to_string()));
    assert_eq!(engine.users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let engine = engine().await;
    engine
        .register_user("Alice", "alice@example.com", "password")
        .await
        .unwrap();

    assert_eq!(
        engine.login("alice@example.com", "passw0rd").await,
        Err(EngineError::InvalidCredentials)
    );
    assert!(matches!(
        engine.login("nobody@example.com", "password").await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        engine.login("alice@example.com", "").await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn registration_is_validated() {
    let engine = engine().await;

    for (name, email, password) in [
        ("", "a@example.com", "password"),
        ("Alice", "not-an-email", "password"),
        ("Alice", "a@example.com", "short"),
    ] {
        assert!(matches!(
            engine.register_user(name, email, password).await,
            Err(EngineError::InvalidInput(_))
        ));
    }
    assert!(engine.users().await.unwrap().is_empty());
}
