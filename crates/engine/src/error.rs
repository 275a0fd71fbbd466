//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when an item is not found or belongs to another user.
//! - [`InvalidValue`] thrown when an input breaks a field constraint.
//! - [`InvalidState`] thrown when a domain action is not allowed from the
//!   current status.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidValue`]: EngineError::InvalidValue
//!  [`InvalidState`]: EngineError::InvalidState
use api_types::UnknownVariant;
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<UnknownVariant> for EngineError {
    fn from(value: UnknownVariant) -> Self {
        Self::InvalidValue(value.to_string())
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidValue(a), Self::InvalidValue(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
