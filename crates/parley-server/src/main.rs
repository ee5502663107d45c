use anyhow::Context;
use clap::Parser;
use parley_chat::Conversations;
use parley_engine::ModelRegistry;
use parley_runtime::BuiltinLoader;
use parley_server::{logging::init_logging, run_server, AppState, ServerArgs};
use parley_session::SessionStore;
use parley_store::SqliteStore;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = ServerArgs::parse();
    init_logging(&args.log_level, &args.log_format);

    let store = SqliteStore::open(&args.database)
        .with_context(|| format!("failed to open {}", args.database.display()))?;

    // Every catalog model must load before the listener binds.
    let records = store.models().context("failed to read model catalog")?;
    if records.is_empty() {
        tracing::warn!("model catalog is empty; /generate will reject every model_id");
    }
    let registry = ModelRegistry::bootstrap(&records, &BuiltinLoader::default())
        .context("model bootstrap failed")?;
    tracing::info!(models = registry.len(), "models loaded");

    let sessions = SessionStore::new(args.session_ttl());
    let shutdown = CancellationToken::new();
    let sweeper = sessions.spawn_sweeper(args.sweep_interval(), shutdown.clone());

    let state = AppState::new(Conversations::new(registry, sessions), store);
    let addr = args.socket_addr().context("invalid listen address")?;

    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown requested");
                signal.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "cannot listen for ctrl-c"),
        }
    });

    run_server(state, addr, shutdown.clone()).await?;

    shutdown.cancel();
    sweeper.await.ok();
    Ok(())
}
