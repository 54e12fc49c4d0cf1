use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::password::HashingError;
use crate::models::{Project, User, UserPatch};

/// Errors surfaced by the user and project stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Hashing(#[from] HashingError),
}

/// Read-modify-write access to user documents.
///
/// There is no optimistic concurrency control: two requests racing on the
/// same user resolve as last write wins.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Write only the fields present in `patch`. A patched password is
    /// hashed before it is written.
    async fn update_fields(&self, id: Uuid, patch: UserPatch) -> Result<(), StoreError>;

    /// Write the whole entity, password hash included as-is
    async fn save(&self, user: &User) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Projects whose linked `provider.id` equals `provider_id`
    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Vec<Project>, StoreError>;
}
