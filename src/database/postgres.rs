use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, Executor, FromRow, PgPool};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::password::{Argon2Hasher, Hasher};
use super::repository::{ProjectStore, StoreError, UserStore};
use crate::config::DatabaseConfig;
use crate::models::{Project, ProviderAccounts, User, UserPatch};

const SCHEMA: &str = include_str!("schema.sql");

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password: String,
    is_ad_user: bool,
    jobs_quantity_on_page: i64,
    accounts: Json<ProviderAccounts>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password: row.password,
            is_ad_user: row.is_ad_user,
            jobs_quantity_on_page: row.jobs_quantity_on_page,
            accounts: row.accounts.0,
        }
    }
}

#[derive(FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    provider: Json<Value>,
}

/// PostgreSQL-backed user and project store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    hasher: Arc<dyn Hasher>,
}

impl PgStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(Self {
            pool,
            hasher: Arc::new(Argon2Hasher::new()),
        })
    }

    /// Create the users and projects tables when missing
    pub async fn migrate(&self) -> Result<(), StoreError> {
        self.pool.execute(SCHEMA).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::UniqueViolation(db_err.message().to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password, is_ad_user, jobs_quantity_on_page, accounts
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn update_fields(&self, id: Uuid, patch: UserPatch) -> Result<(), StoreError> {
        let password = patch
            .password
            .as_deref()
            .map(|plain| self.hasher.hash(plain))
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                password = COALESCE($3, password),
                jobs_quantity_on_page = COALESCE($4, jobs_quantity_on_page),
                accounts = COALESCE($5, accounts),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.email)
        .bind(password)
        .bind(patch.jobs_quantity_on_page)
        .bind(patch.accounts.map(Json))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                password = $3,
                is_ad_user = $4,
                jobs_quantity_on_page = $5,
                accounts = $6,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.is_ad_user)
        .bind(user.jobs_quantity_on_page)
        .bind(Json(&user.accounts))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {}", user.id)));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, provider
            FROM projects
            WHERE provider ->> 'id' = $1
            ORDER BY name
            "#,
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Project {
                id: row.id,
                name: row.name,
                provider: row.provider.0,
            })
            .collect())
    }
}
