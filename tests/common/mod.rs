#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use uuid::Uuid;

use account_api::auth::{generate_jwt, Claims};
use account_api::config::{AppConfig, JobsQuantityConfig};
use account_api::database::password::{Argon2Hasher, Hasher};
use account_api::database::{MemoryStore, ProjectStore, StoreError, UserStore};
use account_api::models::{Project, User, UserPatch};
use account_api::notify::{MailerError, Notifier};
use account_api::AppState;

/// Password every seeded user starts with
pub const SEED_PASSWORD: &str = "password1";

static SEED_PASSWORD_HASH: Lazy<String> =
    Lazy::new(|| Argon2Hasher::new().hash(SEED_PASSWORD).expect("hash seed password"));

pub fn password_matches(plain: &str, hash: &str) -> bool {
    Argon2Hasher::new().verify(plain, hash).expect("stored password is a PHC string")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    PasswordChanged { user: Uuid },
    EmailChanged { user: Uuid, new_email: String, old_email: String },
}

/// Notifier that remembers every call instead of sending mail
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_password_change(&self, user: &User) -> Result<(), MailerError> {
        self.sent
            .lock()
            .unwrap()
            .push(Notification::PasswordChanged { user: user.id });
        Ok(())
    }

    async fn notify_email_change(&self, user: &User, old_email: &str) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(Notification::EmailChanged {
            user: user.id,
            new_email: user.email.clone(),
            old_email: old_email.to_string(),
        });
        Ok(())
    }
}

/// Store failures to inject; reads of users always go through
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    pub fail_writes: bool,
    pub fail_project_lookup: bool,
}

/// Memory store that fails the calls selected by [`Faults`]
struct FaultyStore {
    inner: MemoryStore,
    faults: Faults,
}

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl UserStore for FaultyStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.inner.find_by_id(id).await
    }

    async fn update_fields(&self, id: Uuid, patch: UserPatch) -> Result<(), StoreError> {
        if self.faults.fail_writes {
            return Err(unavailable());
        }
        self.inner.update_fields(id, patch).await
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        if self.faults.fail_writes {
            return Err(unavailable());
        }
        self.inner.save(user).await
    }
}

#[async_trait]
impl ProjectStore for FaultyStore {
    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Vec<Project>, StoreError> {
        if self.faults.fail_project_lookup {
            return Err(unavailable());
        }
        self.inner.find_by_provider_id(provider_id).await
    }
}

/// An app instance bound to a free port, backed by the in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: MemoryStore,
    pub notifier: Arc<RecordingNotifier>,
    pub config: AppConfig,
    pub client: reqwest::Client,
}

/// CSRF secret cookie plus a token derived from it
pub struct CsrfPair {
    pub cookie: String,
    pub token: String,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(AppConfig::development()).await
    }

    pub async fn start_with_jobs_quantity(jobs: JobsQuantityConfig) -> Result<Self> {
        let mut config = AppConfig::development();
        config.jobs_quantity_on_page = jobs;
        Self::start_with(config).await
    }

    pub async fn start_with_faults(faults: Faults) -> Result<Self> {
        Self::launch(AppConfig::development(), faults).await
    }

    pub async fn start_with(config: AppConfig) -> Result<Self> {
        Self::launch(config, Faults::default()).await
    }

    async fn launch(config: AppConfig, faults: Faults) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = MemoryStore::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let faulty = Arc::new(FaultyStore {
            inner: store.clone(),
            faults,
        });
        let state = AppState::new(faulty.clone(), faulty, notifier.clone(), &config);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, account_api::app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            notifier,
            config,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a regular user with the given email and [`SEED_PASSWORD`]
    pub async fn seed_user(&self, email: &str) -> User {
        let user = User::new(email, SEED_PASSWORD_HASH.clone(), 20);
        self.store.insert_user(user.clone()).await;
        user
    }

    pub async fn seed_ad_user(&self, email: &str) -> User {
        let mut user = User::new(email, SEED_PASSWORD_HASH.clone(), 20);
        user.is_ad_user = true;
        self.store.insert_user(user.clone()).await;
        user
    }

    pub async fn seed_project(&self, name: &str, provider_id: &str) {
        self.store
            .insert_project(Project {
                id: Uuid::new_v4(),
                name: name.to_string(),
                provider: serde_json::json!({ "id": provider_id }),
            })
            .await;
    }

    pub async fn stored_user(&self, id: Uuid) -> User {
        self.store.user(id).await.expect("user should exist")
    }

    pub fn token_for(&self, user: &User) -> String {
        let claims = Claims::new(user.id, user.email.clone(), 1);
        generate_jwt(&claims, &self.config.security.jwt_secret).expect("token")
    }

    pub fn put(&self, user: &User, path: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(self.token_for(user))
    }

    pub fn delete(&self, user: &User, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(self.token_for(user))
    }

    pub async fn csrf(&self, user: &User) -> Result<CsrfPair> {
        let resp = self
            .client
            .get(self.url("/account/csrf"))
            .bearer_auth(self.token_for(user))
            .send()
            .await?;

        let cookie = resp
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .context("missing csrf cookie")?
            .to_str()?
            .split(';')
            .next()
            .context("empty csrf cookie")?
            .to_string();
        let body: Value = resp.json().await?;
        let token = body["csrfToken"].as_str().context("missing csrfToken")?.to_string();

        Ok(CsrfPair { cookie, token })
    }

    /// POST a JSON form with a freshly issued CSRF token
    pub async fn post_form(&self, user: &User, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.post_form_raw(user, path, body.to_string()).await
    }

    /// POST an arbitrary body labelled as JSON, with a freshly issued CSRF token
    pub async fn post_form_raw(&self, user: &User, path: &str, body: impl Into<String>) -> Result<(StatusCode, Value)> {
        let csrf = self.csrf(user).await?;
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(self.token_for(user))
            .header(reqwest::header::COOKIE, csrf.cookie)
            .header("x-csrf-token", csrf.token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .send()
            .await?;

        let status = resp.status();
        Ok((status, resp.json().await?))
    }
}

/// First error message of a `{status, errors}` envelope
pub fn first_error(body: &Value) -> &str {
    body["errors"][0]["message"].as_str().unwrap_or_default()
}
