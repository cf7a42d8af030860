use anyhow::Context;
use daystreak::{api, config::Config, db::init_db, Repository, StoreBackend};
use daystreak::{ActivityClock, HttpStreakStore, StreakOrchestrator, StreakStore};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;
    let port = config.port;

    let store: Arc<dyn StreakStore> = match &config.store {
        StoreBackend::Sqlite { database_path } => {
            let pool = init_db(database_path)
                .await
                .with_context(|| format!("Failed to initialize database at {}", database_path))?;
            Arc::new(Repository::new(pool))
        }
        StoreBackend::Http {
            base_url,
            retry_budget,
        } => {
            tracing::info!(url = %base_url, "Using remote streak store");
            Arc::new(HttpStreakStore::new(base_url.clone(), *retry_budget))
        }
    };

    let clock = config.clock();
    match clock.today() {
        Ok(today) => {
            tracing::info!(%today, offset_minutes = ?config.utc_offset_minutes, "Activity clock ready")
        }
        Err(e) => tracing::warn!(error = %e, "Activity clock cannot resolve a local date yet"),
    }

    let orchestrator = Arc::new(StreakOrchestrator::new(store, Arc::new(clock), &config));
    let app = api::create_router(api::AppState::new(orchestrator, config));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
