//! Users table.
//!
//! Every tracked entity is owned by a `user_id`, which is the username.

use sea_orm::entity::prelude::*;
use sha2::{Digest, Sha256};

/// An authenticated user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub username: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(value: Model) -> Self {
        Self {
            username: value.username,
        }
    }
}

/// Hash a password for storage. The username salts the digest so equal
/// passwords of different users do not collide.
pub fn hash_password(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_depends_on_username() {
        let a = hash_password("alice", "secret");
        let b = hash_password("bob", "secret");
        assert_ne!(a, b);
        assert_eq!(a, hash_password("alice", "secret"));
        assert_eq!(a.len(), 64);
    }
}
