use thiserror::Error;

use crate::users::repo_types::{StoreError, UniqueField};

/// Outcomes of the user controller that abort an operation.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("passwords do not match.")]
    PasswordMismatch,
    #[error("role must be selected.")]
    RoleRequired,
    #[error("email already registered.")]
    EmailTaken,
    #[error("username already registered.")]
    UsernameTaken,
    #[error("{0} must not be empty.")]
    Empty(&'static str),
    #[error("user not found.")]
    NotFound,
    #[error("password hashing failed: {0}")]
    Hash(#[source] anyhow::Error),
    #[error(transparent)]
    Store(StoreError),
}

impl UserError {
    /// Rejections caused by the request itself rather than the backend.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            UserError::PasswordMismatch
                | UserError::RoleRequired
                | UserError::EmailTaken
                | UserError::UsernameTaken
                | UserError::Empty(_)
        )
    }
}

impl From<StoreError> for UserError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(UniqueField::Email) => UserError::EmailTaken,
            StoreError::Duplicate(UniqueField::Fname) => UserError::UsernameTaken,
            other => UserError::Store(other),
        }
    }
}
