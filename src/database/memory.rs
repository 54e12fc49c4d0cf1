use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::password::{Argon2Hasher, Hasher};
use super::repository::{ProjectStore, StoreError, UserStore};
use crate::models::{Project, User, UserPatch};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    projects: Vec<Project>,
}

/// Process-local user and project store.
///
/// Used when no `DATABASE_URL` is configured and by the integration tests.
/// Email addresses are unique across users, mirroring the Postgres index.
#[derive(Clone)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
    hasher: Arc<dyn Hasher>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::default(),
            hasher: Arc::new(Argon2Hasher::new()),
        }
    }

    /// Insert or overwrite a user without uniqueness checks
    pub async fn insert_user(&self, user: User) {
        let mut collections = self.collections.write().await;
        collections.users.insert(user.id, user);
    }

    pub async fn insert_project(&self, project: Project) {
        let mut collections = self.collections.write().await;
        collections.projects.push(project);
    }

    pub async fn user(&self, id: Uuid) -> Option<User> {
        self.collections.read().await.users.get(&id).cloned()
    }

    fn email_taken(collections: &Collections, id: Uuid, email: &str) -> bool {
        collections
            .users
            .values()
            .any(|other| other.id != id && other.email == email)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.user(id).await)
    }

    async fn update_fields(&self, id: Uuid, patch: UserPatch) -> Result<(), StoreError> {
        let password = patch
            .password
            .as_deref()
            .map(|plain| self.hasher.hash(plain))
            .transpose()?;

        let mut collections = self.collections.write().await;

        if let Some(email) = &patch.email {
            if Self::email_taken(&collections, id, email) {
                return Err(StoreError::UniqueViolation(format!("email '{}' already exists", email)));
            }
        }

        let user = collections
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;

        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(password) = password {
            user.password = password;
        }
        if let Some(quantity) = patch.jobs_quantity_on_page {
            user.jobs_quantity_on_page = quantity;
        }
        if let Some(accounts) = patch.accounts {
            user.accounts = accounts;
        }

        Ok(())
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;

        if !collections.users.contains_key(&user.id) {
            return Err(StoreError::NotFound(format!("user {}", user.id)));
        }
        if Self::email_taken(&collections, user.id, &user.email) {
            return Err(StoreError::UniqueViolation(format!("email '{}' already exists", user.email)));
        }

        collections.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Vec<Project>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .projects
            .iter()
            .filter(|project| project.provider_id().as_deref() == Some(provider_id))
            .cloned()
            .collect())
    }
}
