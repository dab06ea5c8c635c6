//! BusGo server binary

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use busgo_agent::{DelegatedDialogue, ScriptedDialogue};
use busgo_config::load_settings;
use busgo_llm::{GeminiBackend, LlmConfig};
use busgo_server::{create_router, AppState, SessionManager};
use busgo_store::InventoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("busgo=info,tower_http=info")),
        )
        .init();

    let config_path = std::env::var_os("BUSGO_CONFIG").map(PathBuf::from);
    let settings = load_settings(config_path.as_deref()).context("loading settings")?;

    let store = if settings.data.persist {
        InventoryStore::open(&settings.data.dir).context("opening inventory store")?
    } else {
        InventoryStore::in_memory()
    }
    .with_seat_count(settings.seat_layout.seat_count);
    let store = Arc::new(store);

    let api_key = settings
        .llm
        .api_key
        .clone()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok());
    if api_key.is_none() {
        tracing::warn!("No LLM API key configured; the voice flow will apologize on every turn");
    }
    let backend = GeminiBackend::new(LlmConfig {
        model: settings.llm.model.clone(),
        endpoint: settings.llm.endpoint.clone(),
        api_key,
        timeout: Duration::from_secs(settings.llm.timeout_secs),
        ..Default::default()
    })
    .context("creating text-generation backend")?;

    let layout = settings.seat_layout.clone();
    let scripted = Arc::new(ScriptedDialogue::new(store.clone(), layout.clone()));
    let delegated = Arc::new(DelegatedDialogue::new(
        Arc::new(backend),
        store.clone(),
        layout,
    ));

    let sessions = Arc::new(SessionManager::with_config(
        settings.server.max_sessions,
        Duration::from_secs(settings.server.session_timeout_secs),
        Duration::from_secs(300),
    ));
    let cleanup_shutdown = sessions.start_cleanup_task();

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let state = AppState {
        settings: Arc::new(settings),
        store,
        sessions,
        scripted,
        delegated,
    };

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("BusGo assistant listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .context("serving")?;

    let _ = cleanup_shutdown.send(true);
    Ok(())
}
