use sea_orm::DatabaseConnection;
use std::time::Duration;
use tracing::{error, info};

use engine::ContestEngine;

use crate::persist;

/// Spawn a background task that periodically sweeps every contest clock so
/// auto start, auto freeze and auto end fire without traffic, persisting
/// the facts of each contest whose clock moved.
pub fn spawn_tick_task(
    engine: ContestEngine,
    db: DatabaseConnection,
    tick_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_interval);

        loop {
            interval.tick().await;
            let changed = engine.tick_all().await;
            for (contest_id, facts) in &changed {
                if let Err(err) = persist::update_facts(&db, *contest_id, facts).await {
                    error!(contest_id, %err, "failed to persist advanced contest clock");
                }
            }
            if !changed.is_empty() {
                info!(contests = changed.len(), "contest clocks advanced");
            }
        }
    })
}
