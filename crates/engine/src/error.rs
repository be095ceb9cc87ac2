//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidInput`] thrown when an amount, label or account field fails validation.
//! - [`InvalidIndex`] thrown when an entry position is outside the ledger.
//! - [`NotFound`] thrown when a user, entry or transaction is absent.
//! - [`Conflict`] thrown when the ledger was saved by someone else in between.
//! - [`Unavailable`] thrown when the database fails.
//!
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvalidIndex`]: EngineError::InvalidIndex
//!  [`NotFound`]: EngineError::NotFound
//!  [`Conflict`]: EngineError::Conflict
//!  [`Unavailable`]: EngineError::Unavailable
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid entry index: {0}")]
    InvalidIndex(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Ledger changed concurrently: {0}")]
    Conflict(String),
    #[error("Stored ledger is corrupted: {0}")]
    Corrupted(String),
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Unavailable(#[from] DbErr),
}

impl EngineError {
    /// Machine readable name of the error, stable across messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidIndex(_) => "invalid_index",
            Self::NotFound(_) => "not_found",
            Self::ExistingKey(_) => "existing_key",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Conflict(_) => "conflict",
            Self::Corrupted(_) => "corrupted",
            Self::PasswordHash(_) => "password_hash",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidIndex(a), Self::InvalidIndex(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Corrupted(a), Self::Corrupted(b)) => a == b,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Unavailable(a), Self::Unavailable(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
