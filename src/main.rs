//! Fanline server entry point: wires the database, realtime engine,
//! background jobs and HTTP surface together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use fanline_core::config::AppConfig;
use fanline_core::error::AppError;
use fanline_core::result::AppResult;

#[tokio::main]
async fn main() {
    let env = std::env::var("FANLINE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting Fanline v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let pool = fanline_database::connection::create_pool(&config.database).await?;
    fanline_database::connection::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let users = Arc::new(fanline_database::repositories::user::UserRepository::new(
        pool.clone(),
    ));
    let notifications = Arc::new(
        fanline_database::repositories::notification::NotificationRepository::new(pool.clone()),
    );

    let engine = fanline_realtime::RealtimeEngine::new(
        config.realtime.clone(),
        users,
        notifications.clone(),
    );
    fanline_realtime::gateway::init(engine.emitter());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handles = fanline_worker::Scheduler::new()
        .register(Arc::new(fanline_worker::jobs::PresenceSweepJob::new(
            Arc::clone(&engine),
            Duration::from_secs(config.worker.presence_sweep_interval_seconds),
        )))
        .register(Arc::new(fanline_worker::jobs::RetentionSweepJob::new(
            notifications,
            chrono::Duration::minutes(config.worker.read_retention_minutes as i64),
            Duration::from_secs(config.worker.retention_sweep_interval_seconds),
        )))
        .spawn(shutdown_rx);

    let state = fanline_api::AppState::new(Arc::clone(&engine), config.auth.clone());
    let router = fanline_api::build_router(state, &config.server.cors_origins);

    let addr = config.server.bind_addr();
    tracing::info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::with_source(
            fanline_core::error::ErrorKind::Internal,
            format!("Failed to bind {addr}"),
            e,
        ))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::with_source(
            fanline_core::error::ErrorKind::Internal,
            "Server failed",
            e,
        ))?;

    tracing::info!("Shutting down background jobs...");
    let _ = shutdown_tx.send(true);
    for handle in worker_handles {
        let _ = handle.await;
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
