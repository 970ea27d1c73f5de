//! Error types shared across the store, storage bridge, forms and session.
//!
//! Storage and transfer failures are absorbed at their boundary (logged, then
//! treated as "no data"); validation and index errors are rendered back to
//! the caller as HTML fragments.

use thiserror::Error;

/// Failure writing to the browser key-value storage mirror.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("storage is unavailable")]
    Unavailable,
}

/// Store operations addressed by position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no monster at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("catalog only has {distinct} distinct names, a team needs 5")]
    CatalogTooSmall { distinct: usize },
}

/// Import payloads that could not be turned into a monster list.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid monster JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("monster payload is not a list")]
    NotAList,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
}

/// A single failed form field check.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("A monster with this name already exists")]
    DuplicateName,
    #[error("Description is required")]
    DescriptionRequired,
}

impl ValidationError {
    /// Form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NameRequired | ValidationError::DuplicateName => "name",
            ValidationError::DescriptionRequired => "description",
        }
    }
}
