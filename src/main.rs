use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use account_api::auth::{generate_jwt, Claims};
use account_api::config::{self, AppConfig};
use account_api::database::password::{Argon2Hasher, Hasher};
use account_api::database::{MemoryStore, PgStore, ProjectStore, UserStore};
use account_api::models::User;
use account_api::notify::{EmailNotifier, LogMailer, Mailer, SmtpMailer};
use account_api::AppState;

#[derive(Parser)]
#[command(name = "account-api")]
#[command(about = "Account API - provider accounts, password, email and preferences of the signed-in user")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides ACCOUNT_API_PORT)")]
        port: Option<u16>,
        #[arg(long, help = "With the in-memory store: create a user with this email and print a token for it")]
        seed_email: Option<String>,
        #[arg(long, default_value = "changeme", help = "Password for the seeded user")]
        seed_password: String,
    },

    #[command(about = "Mint a bearer token for an existing user")]
    Token {
        #[arg(long, help = "User id")]
        user: Uuid,
        #[arg(long, help = "User email")]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        seed_email: None,
        seed_password: "changeme".to_string(),
    }) {
        Commands::Serve {
            port,
            seed_email,
            seed_password,
        } => serve(config, port, seed_email, seed_password).await,
        Commands::Token { user, email } => {
            let claims = Claims::new(user, email, config.security.jwt_expiry_hours);
            println!("{}", generate_jwt(&claims, &config.security.jwt_secret)?);
            Ok(())
        }
    }
}

async fn serve(
    config: &AppConfig,
    port: Option<u16>,
    seed_email: Option<String>,
    seed_password: String,
) -> anyhow::Result<()> {
    tracing::info!("Starting Account API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let mut pg_store: Option<Arc<PgStore>> = None;

    let (users, projects): (Arc<dyn UserStore>, Arc<dyn ProjectStore>) = match &config.database.url {
        Some(url) => {
            let store = Arc::new(
                PgStore::connect(url, &config.database)
                    .await
                    .context("failed to connect to database")?,
            );
            store.migrate().await.context("failed to apply schema")?;
            pg_store = Some(store.clone());
            (store.clone() as Arc<dyn UserStore>, store as Arc<dyn ProjectStore>)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            let store = Arc::new(MemoryStore::new());
            if let Some(email) = seed_email {
                seed_user(&store, config, email, &seed_password).await?;
            }
            (store.clone() as Arc<dyn UserStore>, store as Arc<dyn ProjectStore>)
        }
    };

    let mailer: Arc<dyn Mailer> = match &config.mail.smtp_host {
        Some(host) => Arc::new(SmtpMailer::new(host, config.mail.smtp_port, &config.mail.from)?),
        None => Arc::new(LogMailer),
    };
    let notifier = Arc::new(EmailNotifier::new(mailer));

    let state = AppState::new(users, projects, notifier, config);
    let app = account_api::app(state);

    let bind_addr = format!("{}:{}", config.server.bind, port.unwrap_or(config.server.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Account API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(store) = pg_store {
        store.close().await;
    }

    Ok(())
}

async fn seed_user(store: &MemoryStore, config: &AppConfig, email: String, password: &str) -> anyhow::Result<()> {
    let hash = Argon2Hasher::new().hash(password)?;
    let user = User::new(email, hash, config.jobs_quantity_on_page.default);
    let claims = Claims::new(user.id, user.email.clone(), config.security.jwt_expiry_hours);
    let token = generate_jwt(&claims, &config.security.jwt_secret)?;

    tracing::info!("Seeded user {} ({})", user.email, user.id);
    println!("Bearer token for {}: {}", user.email, token);

    store.insert_user(user).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
