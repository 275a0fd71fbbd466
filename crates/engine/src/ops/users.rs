use sea_orm::{ActiveValue, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, User, hash_password, users};

use super::{Engine, with_tx};

impl Engine {
    /// Register a new user.
    pub async fn new_user(&self, username: &str, password: &str) -> ResultEngine<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(EngineError::InvalidValue(
                "username and password must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username.to_string()));
            }
            users::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                password_hash: ActiveValue::Set(hash_password(username, password)),
            }
            .insert(&db_tx)
            .await?;
            Ok(User {
                username: username.to_string(),
            })
        })
    }

    /// Check Basic credentials against the stored hash.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .ok_or(EngineError::InvalidCredentials)?;
        if model.password_hash != hash_password(username, password) {
            return Err(EngineError::InvalidCredentials);
        }
        Ok(User::from(model))
    }

    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    pub async fn set_password(&self, username: &str, password: &str) -> ResultEngine<()> {
        if password.is_empty() {
            return Err(EngineError::InvalidValue(
                "password must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound(format!("user {username}")));
            }
            users::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                password_hash: ActiveValue::Set(hash_password(username, password)),
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }
}
