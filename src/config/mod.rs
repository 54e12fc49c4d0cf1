use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub jobs_quantity_on_page: JobsQuantityConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string; the in-memory store is used when unset
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub csrf_cookie_name: String,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
}

/// Per-user "jobs per page" UI preference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsQuantityConfig {
    pub enabled: bool,
    pub default: i64,
    pub min: i64,
    pub max: i64,
}

impl JobsQuantityConfig {
    pub fn contains(&self, quantity: i64) -> bool {
        (self.min..=self.max).contains(&quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay; notifications are only logged when unset
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub from: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("ACCOUNT_API_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = env::var("ACCOUNT_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|url| !url.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CSRF_COOKIE_NAME") {
            self.security.csrf_cookie_name = v;
        }
        if let Ok(v) = env::var("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Jobs quantity overrides
        if let Ok(v) = env::var("JOBS_QUANTITY_ON_PAGE_ENABLED") {
            self.jobs_quantity_on_page.enabled = v.parse().unwrap_or(self.jobs_quantity_on_page.enabled);
        }
        if let Ok(v) = env::var("JOBS_QUANTITY_ON_PAGE_DEFAULT") {
            self.jobs_quantity_on_page.default = v.parse().unwrap_or(self.jobs_quantity_on_page.default);
        }
        if let Ok(v) = env::var("JOBS_QUANTITY_ON_PAGE_MIN") {
            self.jobs_quantity_on_page.min = v.parse().unwrap_or(self.jobs_quantity_on_page.min);
        }
        if let Ok(v) = env::var("JOBS_QUANTITY_ON_PAGE_MAX") {
            self.jobs_quantity_on_page.max = v.parse().unwrap_or(self.jobs_quantity_on_page.max);
        }

        // Mail overrides
        if let Ok(v) = env::var("SMTP_HOST") {
            self.mail.smtp_host = Some(v).filter(|host| !host.trim().is_empty());
        }
        if let Ok(v) = env::var("SMTP_PORT") {
            self.mail.smtp_port = v.parse().unwrap_or(self.mail.smtp_port);
        }
        if let Ok(v) = env::var("SMTP_FROM") {
            self.mail.from = v;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: "development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                csrf_cookie_name: "_csrf".to_string(),
                cookie_secure: false,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            jobs_quantity_on_page: JobsQuantityConfig::default(),
            mail: MailConfig {
                smtp_host: None,
                smtp_port: 1025,
                from: "noreply@localhost".to_string(),
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                csrf_cookie_name: "_csrf".to_string(),
                cookie_secure: true,
                cors_origins: vec!["https://staging.ci.example.com".to_string()],
            },
            jobs_quantity_on_page: JobsQuantityConfig::default(),
            mail: MailConfig {
                smtp_host: None,
                smtp_port: 587,
                from: "noreply@staging.example.com".to_string(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                csrf_cookie_name: "_csrf".to_string(),
                cookie_secure: true,
                cors_origins: vec!["https://ci.example.com".to_string()],
            },
            jobs_quantity_on_page: JobsQuantityConfig::default(),
            mail: MailConfig {
                smtp_host: None,
                smtp_port: 587,
                from: "noreply@example.com".to_string(),
            },
        }
    }
}

impl Default for JobsQuantityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default: 20,
            min: 5,
            max: 100,
        }
    }
}

// Loaded once, on first access
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
