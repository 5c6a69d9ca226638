use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warmline_api::background;
use warmline_api::config::ServerConfig;
use warmline_api::router::build_app_router;
use warmline_api::state::AppState;
use warmline_engine::Engine;
use warmline_events::EventBus;
use warmline_gateway::{HttpGateway, MessageGateway};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warmline_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = warmline_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    warmline_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    warmline_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Gateway client ---
    let gateway: Arc<dyn MessageGateway> = Arc::new(
        HttpGateway::new(
            config.gateway_base_url.clone(),
            Duration::from_secs(config.gateway_timeout_secs),
        )
        .expect("Failed to build gateway client"),
    );
    tracing::info!(base_url = %config.gateway_base_url, "Gateway client ready");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Spawn event persistence (writes all events to the database).
    let persistence_handle = tokio::spawn(warmline_events::EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    // --- Engine ---
    let engine = Arc::new(Engine::new(
        pool.clone(),
        Arc::clone(&gateway),
        Arc::clone(&event_bus),
        config.engine_config(),
    ));
    tracing::info!("Engine ready");

    // --- Background jobs ---
    let cancel = CancellationToken::new();
    let dispatch_handle = tokio::spawn(background::dispatch_loop::run(
        Arc::clone(&engine),
        config.dispatch_interval_secs,
        cancel.clone(),
    ));
    let rollover_handle = tokio::spawn(background::rollover::run(
        Arc::clone(&engine),
        cancel.clone(),
    ));

    // --- Router & server ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine,
        gateway,
        event_bus,
    };
    let app = build_app_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT combination");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!(%addr, "Warmline API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Shutdown ---
    tracing::info!("Shutting down background jobs");
    cancel.cancel();
    let _ = dispatch_handle.await;
    let _ = rollover_handle.await;
    persistence_handle.abort();
    tracing::info!("Shutdown complete");
}

/// Resolve when the process receives Ctrl-C / SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
