//! Board Tally Back binary entrypoint wiring REST routes over the record and live stores.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use board_tally_back::{
    config::AppConfig,
    dao::{live_store::LiveStore, record_store::RecordStore, storage::StorageError},
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_state = AppState::new(AppConfig::load());

    spawn_record_supervisor(app_state.clone());
    spawn_live_supervisor(app_state.clone());

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Supervise the MongoDB record store in the background.
#[cfg(feature = "mongo-record")]
fn spawn_record_supervisor(state: SharedState) {
    use board_tally_back::dao::record_store::mongodb::{MongoConfig, MongoRecordStore};

    let uri = env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
    let db_name = env::var("MONGO_DB").ok();

    tokio::spawn(storage_supervisor::run(state, move || {
        let uri = uri.clone();
        let db_name = db_name.clone();
        async move {
            let config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
            let store = MongoRecordStore::connect(config).await?;
            Ok::<Arc<dyn RecordStore>, StorageError>(Arc::new(store))
        }
    }));
}

#[cfg(not(feature = "mongo-record"))]
fn spawn_record_supervisor(_state: SharedState) {
    tracing::warn!("no record store backend compiled in; staying in degraded mode");
}

/// Supervise the HTTP live store in the background.
#[cfg(feature = "http-live")]
fn spawn_live_supervisor(state: SharedState) {
    use board_tally_back::dao::live_store::http::{HttpLiveStore, LiveConfig};

    let base_url = env::var("LIVE_BASE_URL").unwrap_or_else(|_| "http://localhost:9000".into());
    let auth_token = env::var("LIVE_AUTH_TOKEN").ok();

    tokio::spawn(storage_supervisor::run(state, move || {
        let mut config = LiveConfig::new(base_url.clone());
        if let Some(ref token) = auth_token {
            config = config.with_auth_token(token.clone());
        }
        async move {
            let store = HttpLiveStore::connect(config).await?;
            Ok::<Arc<dyn LiveStore>, StorageError>(Arc::new(store))
        }
    }));
}

#[cfg(not(feature = "http-live"))]
fn spawn_live_supervisor(_state: SharedState) {
    tracing::warn!("no live store backend compiled in; staying in degraded mode");
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
