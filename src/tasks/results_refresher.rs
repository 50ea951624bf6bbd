use crate::voting::VoteEngine;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

// Refetches results for one engine every `period` until aborted.
pub async fn refresh_results_task(engine: Arc<VoteEngine>, container_id: String, period: Duration) {
    info!(
        "Starting results refresh for {} every {}s",
        container_id,
        period.as_secs()
    );
    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the mount already fetched.
    interval.tick().await;

    loop {
        interval.tick().await;
        debug!("Refreshing results for {}", container_id);
        engine.fetch_results().await;
    }
}

pub fn spawn(engine: Arc<VoteEngine>, container_id: String, period: Duration) -> JoinHandle<()> {
    tokio::spawn(refresh_results_task(engine, container_id, period))
}
