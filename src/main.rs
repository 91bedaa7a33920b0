//! EntryVentures Backend Server
//!
//! Loan-management REST API: clients, loans, loan collections and API users,
//! persisted in PostgreSQL and guarded by bearer tokens.

use anyhow::Context;
use std::net::SocketAddr;
use tokio::signal;

use entryventures_server::config::Config;
use entryventures_server::db;
use entryventures_server::repository::PgStore;
use entryventures_server::routes;
use entryventures_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(environment = config.environment.as_str(), "Starting EntryVentures API");

    // Initialize database connection pool
    let db_pool = db::create_pool(&config).await?;
    db::run_migrations(&db_pool).await?;
    let user_count = db::check_health(&db_pool).await?;
    if user_count == 0 && config.admin.is_none() {
        tracing::warn!("No API users exist and ADMIN_USERNAME is unset; nobody can log in");
    }

    let app_state = AppState::postgres(
        PgStore::new(db_pool),
        config.jwt_secret.clone(),
        config.jwt_access_token_ttl_seconds,
        config.bcrypt_cost,
    );

    if let Some(admin) = &config.admin {
        match app_state.auth_service.ensure_admin(admin).await {
            Ok(Some(user)) => tracing::info!(username = %user.username, "Bootstrap admin created"),
            Ok(None) => {}
            Err(e) => return Err(anyhow::anyhow!("Failed to bootstrap admin user: {}", e)),
        }
    }

    let app = routes::app(app_state, &config.cors_allowed_origins);

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!(origins = ?config.cors_allowed_origins, "CORS allow-list");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
