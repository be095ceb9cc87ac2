use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use sea_orm::DatabaseConnection;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::ResultEngine;

mod accounts;
mod ledger;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

type Writers = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    writers: Writers,
}

/// Exclusive write access to one user's ledger.
///
/// The user's lock is dropped from `Engine::writers` once no guard holds it
/// and nobody waits for it.
pub(crate) struct WriterGuard<'a> {
    writers: &'a Writers,
    user_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for WriterGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        let unused = writers
            .get(&self.user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if unused {
            writers.remove(&self.user_id);
        }
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Wait for exclusive write access to one user's ledger.
    ///
    /// Only guards writers inside this process; the version check on save
    /// covers other processes sharing the database.
    async fn writer(&self, user_id: &str) -> WriterGuard<'_> {
        let lock = {
            let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(writers.entry(user_id.to_string()).or_default())
        };
        let mut writer = WriterGuard {
            writers: &self.writers,
            user_id: user_id.to_string(),
            guard: None,
        };
        writer.guard = Some(lock.lock_owned().await);
        writer
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            writers: Mutex::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use migration::MigratorTrait;
    use sea_orm::Database;

    use super::*;
    use crate::{EngineError, Ledger};

    async fn engine() -> Engine {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        Engine::builder().database(db).build().await.unwrap()
    }

    fn writers_len(engine: &Engine) -> usize {
        engine.writers.lock().unwrap().len()
    }

    #[tokio::test]
    async fn unknown_users_leave_no_writer_locks() {
        let engine = engine().await;

        for i in 0..200 {
            let user_id = format!("ghost-{i}");
            let err = engine
                .save_ledger(&user_id, &mut Ledger::default())
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::NotFound(_)));

            let err = engine
                .add_entry(&user_id, 10, chrono::NaiveDate::MIN)
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::NotFound(_)));
        }

        assert_eq!(writers_len(&engine), 0);
    }

    #[tokio::test]
    async fn writer_lock_lives_while_held_or_awaited() {
        let engine = Arc::new(engine().await);

        let first = engine.writer("alice").await;
        assert_eq!(writers_len(&engine), 1);

        let waiter = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let _second = engine.writer("alice").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        assert_eq!(writers_len(&engine), 1);

        waiter.await.unwrap();
        assert_eq!(writers_len(&engine), 0);
    }
}
