use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use menuacl_api::{router, AppState};
use menuacl_infrastructure::{create_pool, run_migrations, MemorySeed, MemoryStore, Repositories};
use menuacl_shared::config::{AppConfig, CorsSettings, DatabaseSettings, StoreBackend};
use menuacl_shared::constants::OPERATOR_HEADER;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry; the guard flushes file logs on exit
    let _log_guard = menuacl_shared::telemetry::init_telemetry(&config.log)?;

    info!("{} starting ({})...", config.app.name, config.app.env);

    let repos = connect_store(&config.database).await?;
    let state = AppState::new(
        repos.menus,
        repos.modules,
        repos.assignments,
        repos.audit,
        repos.health,
    );

    let app = router(state).layer(cors_layer(&config.cors));

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn connect_store(settings: &DatabaseSettings) -> anyhow::Result<Repositories> {
    match settings.backend {
        StoreBackend::Postgres => {
            info!("Connecting to database at {}...", settings.url);
            let pool = create_pool(settings)
                .await
                .context("connecting to database")?;
            if settings.run_migrations {
                run_migrations(&pool).await.context("running migrations")?;
            }
            info!("Database connection established.");
            Ok(Repositories::postgres(pool))
        }
        StoreBackend::Memory => {
            let store = match &settings.seed_path {
                Some(path) => {
                    let seed = MemorySeed::from_path(path)
                        .with_context(|| format!("loading seed file {}", path))?;
                    MemoryStore::from_seed(seed).await?
                }
                None => {
                    warn!("In-memory store started empty; set database.seed_path to preload data");
                    MemoryStore::new()
                }
            };
            Ok(Repositories::memory(Arc::new(store)))
        }
    }
}

fn cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(OPERATOR_HEADER)])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
