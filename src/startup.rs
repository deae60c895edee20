use crate::config::{Config, StoreBackend};
use crate::db;
use crate::engine::StorageEngine;
use crate::error::{ConfigError, StartupError};
use crate::polls::{get_poll_result, submit_feeling};
use crate::store::{CounterStore, MemoryCounterStore, PgCounterStore};
use axum::{
    Router,
    extract::Extension,
    http::{Method, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::{get, put},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tokio::time::{Duration, interval};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<StorageEngine>,
}

impl AppState {
    pub fn new(engine: StorageEngine) -> Self {
        AppState {
            engine: Arc::new(engine),
        }
    }

    /// Connect the configured backend. Any failure here aborts startup.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let store: Arc<dyn CounterStore> = match (config.backend, &config.postgres) {
            (StoreBackend::Postgres, Some(pg)) => {
                let pool =
                    db::init_db(&pg.database_url, pg.max_connections, config.store_timeout)
                        .await?;
                db::ensure_schema(&pool, &pg.table_name).await?;
                let store = PgCounterStore::new(pool, pg.table_name.clone())?;
                info!("Using Postgres table {}", store.table());
                Arc::new(store)
            }
            (StoreBackend::Postgres, None) => {
                return Err(ConfigError::Missing("DATABASE_URL").into());
            }
            (StoreBackend::Memory, _) => {
                warn!("Using in-memory store, counts are lost on restart");
                Arc::new(MemoryCounterStore::new())
            }
        };

        let engine = StorageEngine::new(store).with_timeout(config.store_timeout);
        Ok(AppState::new(engine))
    }

    /// Periodically probe the backend and log when it stops answering.
    pub fn spawn_health_check(&self, every: Duration) {
        let engine = self.engine.clone();
        tokio::spawn(async move {
            let mut interval = interval(every);
            loop {
                interval.tick().await;
                if let Err(e) = engine.ping().await {
                    error!("Storage health check failed: {}", e);
                }
            }
        });
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/poll", put(submit_feeling))
        .route("/poll/:date", get(get_poll_result))
        .layer(Extension(app_state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .fallback(handler_404)
}

pub async fn run(config: Config) -> Result<(), StartupError> {
    info!("Initializing state...");
    let app_state = AppState::from_config(&config).await?;
    app_state.spawn_health_check(Duration::from_secs(60));

    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
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
}
