use std::sync::Arc;

use anyhow::{Context, Result, bail};
use khanom_shop::app::{AppState, build_router};
use khanom_shop::config::{AppConfig, db::create_pool};
use khanom_shop::db::MySqlDb;
use khanom_shop::store::{MemoryStore, Store, seed::seed};
use khanom_shop::time::{Clock, SystemClock};
use khanom_shop::web::spa::PageShell;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn init_tracing(production: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,khanom_shop=debug,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if production {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_store(config: &AppConfig) -> Result<(Store, bool)> {
    if config.db.is_valid() {
        let pool = create_pool(&config.db)?;
        tracing::info!("using MySQL store");
        return Ok((Store::mysql(Arc::new(MySqlDb::new(pool))), config.seed_demo_data));
    }
    if config.is_production() {
        bail!("DATABASE_URL is required in production");
    }
    tracing::warn!("DATABASE_URL is not set; using the in-memory store");
    Ok((Store::memory(MemoryStore::new()), true))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let production = std::env::var("APP_ENV").is_ok_and(|v| v == "production");
    init_tracing(production);

    let config = AppConfig::from_env().context("loading configuration")?;
    tracing::info!(
        env = %config.app_env,
        csrf = config.is_csrf_enabled(),
        "configuration loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (store, seed_data) = open_store(&config)?;
    let shell = PageShell::load(config.spa_template.as_deref())?;
    let state = AppState::new(&config, store, clock, shell);

    if seed_data {
        let (store, hasher, now) = (state.store.clone(), state.hasher, state.now());
        let report = tokio::task::spawn_blocking(move || seed(&store, &hasher, now))
            .await
            .context("seeding task failed")??;
        tracing::info!(users = report.users, products = report.products, "demo data seeded");
    }

    let app = build_router(state, &config)?;

    let listener = TcpListener::bind(&config.http.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.http.bind_addr))?;
    tracing::info!(addr = %config.http.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}
