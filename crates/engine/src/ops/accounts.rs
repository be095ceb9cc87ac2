use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User,
    password::{hash_password, verify_password},
    users,
    util::{normalize_email, normalize_required_text, validate_password},
};

use super::{Engine, with_tx};

impl Engine {
    /// Create an account and return its user id.
    ///
    /// The email is trimmed and lower-cased before the uniqueness check.
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ResultEngine<String> {
        let name = normalize_required_text(name, "name")?;
        let email = normalize_email(email)?;
        validate_password(password)?;
        let password = hash_password(password)?;

        let user_id = with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::Email.eq(email.as_str()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(email));
            }

            let user_id = Uuid::new_v4().to_string();
            users::ActiveModel {
                id: ActiveValue::Set(user_id.clone()),
                name: ActiveValue::Set(name),
                email: ActiveValue::Set(email),
                password: ActiveValue::Set(password),
                ledger_version: ActiveValue::Set(0),
            }
            .insert(&db_tx)
            .await?;
            Ok::<_, EngineError>(user_id)
        })?;

        tracing::info!(%user_id, "user registered");
        Ok(user_id)
    }

    /// Check credentials and return the user id they belong to.
    pub async fn login(&self, email: &str, password: &str) -> ResultEngine<String> {
        if password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        let email = normalize_email(email)?;

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {email}")))?;

        if !verify_password(password, &user.password)? {
            tracing::info!(%email, "rejected login");
            return Err(EngineError::InvalidCredentials);
        }
        Ok(user.id)
    }

    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        self.require_user(&self.database, user_id)
            .await
            .map(User::from)
    }

    /// Every registered user, ordered by email.
    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Email)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))
    }
}
