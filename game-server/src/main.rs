use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

use game_persistence::{
    SessionRepository, VocabularyRepository, VocabularySource, connection::connect_and_migrate,
};
use game_server::{
    config::Config,
    create_routes,
    session_manager::{SessionManager, SessionSettings},
    websocket::ConnectionManager,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Lingua Arena server...");

    let config = Config::new();
    let connection_manager = Arc::new(ConnectionManager::new());

    // Initialize database connection and run migrations
    let db = match connect_and_migrate(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    let vocabulary: Arc<dyn VocabularySource> = Arc::new(VocabularyRepository::new(db.clone()));
    let session_manager = Arc::new(
        SessionManager::new(
            connection_manager.clone(),
            vocabulary,
            SessionSettings::from(&config),
        )
        .with_repository(SessionRepository::new(db)),
    );

    let routes = create_routes(connection_manager.clone(), session_manager.clone());

    // Start cleanup task
    let cleanup_connection_manager = connection_manager.clone();
    let cleanup_session_manager = session_manager.clone();
    let connection_timeout = Duration::from_secs(config.connection_timeout_seconds);
    let cleanup_interval = Duration::from_secs(config.cleanup_interval_seconds);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;

            cleanup_connection_manager
                .cleanup_inactive_connections(connection_timeout)
                .await;
            let evicted = cleanup_session_manager.cleanup_finished_sessions();
            if evicted > 0 {
                info!("Evicted {} finished sessions", evicted);
            }
        }
    });

    let host = match config.host.parse::<std::net::IpAddr>() {
        Ok(host) => host,
        Err(e) => {
            error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    info!("Server starting on {}:{}", host, config.port);

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown((host, config.port), async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
                .expect("Failed to listen for SIGINT");
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to listen for SIGTERM");

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
