use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{Level, info};

use common::SystemClock;
use engine::ContestEngine;
use server::config::AppConfig;
use server::database::init_db;
use server::state::AppState;
use server::{build_router, recovery, ticker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;
    let db = init_db(&config.database.url).await?;

    let engine = ContestEngine::new(Arc::new(SystemClock));
    let restored = recovery::load_contests(&db, &engine).await?;
    info!(restored, "engine rehydrated from storage");

    ticker::spawn_tick_task(
        engine.clone(),
        db.clone(),
        Duration::from_secs(config.engine.tick_interval_s),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState { engine, db, config };
    let app = build_router(state);

    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
