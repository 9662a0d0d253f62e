use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use project_dashboard::app::{app, AppState, Backends};
use project_dashboard::auth::{generate_jwt, TokenVerifier};
use project_dashboard::config::{self, AppConfig};
use project_dashboard::database::{
    DatabaseManager, MemoryBenchmarkStore, MemoryPreferenceStore, MemoryProjectStore, PgBenchmarkStore,
    PgPreferenceStore, PgProjectStore,
};
use project_dashboard::identity::{Auth0IdentityLookup, IdentityLookup, StaticIdentityLookup};

#[derive(Parser)]
#[command(name = "project-dashboard")]
#[command(about = "Project tracking backend API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind, overrides API_LISTEN_ADDR
        #[arg(long)]
        listen_addr: Option<String>,

        /// Keep all documents in memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },

    /// Print a signed development token
    MintToken {
        #[arg(long)]
        subject: String,

        #[arg(long = "role", required = true)]
        roles: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")))
        .init();

    let cli = Cli::parse();
    let config = config::config();

    match cli.command {
        Commands::Serve { listen_addr, in_memory } => serve(config, listen_addr, in_memory).await,
        Commands::MintToken { subject, roles } => {
            let token = generate_jwt(&config.security, &subject, &roles).context("failed to sign token")?;
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(config: &AppConfig, listen_addr: Option<String>, in_memory: bool) -> Result<()> {
    info!("Starting Project Dashboard API in {:?} mode", config.environment);

    let verifier = TokenVerifier::from_config(&config.security).context("token verification")?;
    let identity = identity_lookup(config);

    let (backends, pool) = if in_memory {
        warn!("Serving from in-memory stores, nothing will be persisted");
        let backends = Backends {
            projects: Arc::new(MemoryProjectStore::new()),
            benchmarks: Arc::new(MemoryBenchmarkStore::new()),
            preferences: Arc::new(MemoryPreferenceStore::new()),
            identity,
        };
        (backends, None)
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to the document store")?;
        DatabaseManager::ensure_schema(&pool).await?;
        let backends = Backends {
            projects: Arc::new(PgProjectStore::new(pool.clone())?),
            benchmarks: Arc::new(PgBenchmarkStore::new(pool.clone())?),
            preferences: Arc::new(PgPreferenceStore::new(pool.clone())),
            identity,
        };
        (backends, Some(pool))
    };

    let state = AppState::new(backends, verifier, config.identity.timeout());
    let router = app(state, &config.api, &config.security);

    let bind_addr = listen_addr.unwrap_or_else(|| config.api.listen_addr.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Project Dashboard API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pool) = pool {
        pool.close().await;
        info!("Database pool closed");
    }
    Ok(())
}

/// The Auth0 client when configured, otherwise an empty directory so the
/// API still serves projects without display fields.
fn identity_lookup(config: &AppConfig) -> Arc<dyn IdentityLookup> {
    match Auth0IdentityLookup::from_config(&config.identity) {
        Ok(lookup) => Arc::new(lookup),
        Err(e) => {
            warn!(error = %e, "Identity provider unavailable, user display fields will be empty");
            Arc::new(StaticIdentityLookup::new(Vec::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
