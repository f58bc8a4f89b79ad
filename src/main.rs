//! Pictura Back binary entrypoint wiring the REST layer, the lobby store and the word supply.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pictura_back::{
    AppConfig,
    dao::{
        lobby_store::InMemoryLobbyStore,
        word_provider::{
            OfflineWordProvider, OpenAiConfig, OpenAiWordProvider, ProviderError, WordProvider,
        },
    },
    routes,
    services::word_service,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config.clone(), word_provider());

    install_storage(&app_state).await;
    tokio::spawn(word_service::run_eviction_sweeper(
        app_state.words().clone(),
        config.word_supply.sweep_interval,
        config.word_supply.idle_ttl,
    ));

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

/// Remote word provider when `OPENAI_API_KEY` is set, the offline provider otherwise.
fn word_provider() -> Arc<dyn WordProvider> {
    match OpenAiConfig::from_env().and_then(OpenAiWordProvider::new) {
        Ok(provider) => {
            info!("using the OpenAI word provider");
            Arc::new(provider)
        }
        Err(ProviderError::MissingEnvVar { var }) => {
            info!(var, "word provider not configured; serving fallback words");
            Arc::new(OfflineWordProvider)
        }
        Err(err) => {
            warn!(error = %err, "failed to set up the word provider; serving fallback words");
            Arc::new(OfflineWordProvider)
        }
    }
}

/// Supervise CouchDB when `COUCH_BASE_URL` is set, otherwise keep lobbies in memory.
async fn install_storage(state: &SharedState) {
    #[cfg(feature = "couch-store")]
    if env::var_os("COUCH_BASE_URL").is_some() {
        use pictura_back::{
            dao::{
                lobby_store::{
                    LobbyStore,
                    couchdb::{CouchConfig, CouchLobbyStore},
                },
                storage::StorageError,
            },
            services::storage_supervisor,
        };

        match CouchConfig::from_env() {
            Ok(couch) => {
                info!(database = %couch.database, "supervising CouchDB lobby store");
                tokio::spawn(storage_supervisor::run(state.clone(), move || {
                    let couch = couch.clone();
                    async move {
                        CouchLobbyStore::connect(couch)
                            .await
                            .map(|store| Arc::new(store) as Arc<dyn LobbyStore>)
                            .map_err(StorageError::from)
                    }
                }));
                return;
            }
            Err(err) => warn!(error = %err, "invalid CouchDB configuration; using memory store"),
        }
    }

    info!("using the in-memory lobby store");
    state
        .install_lobby_store(Arc::new(InMemoryLobbyStore::new()))
        .await;
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

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
