//! Background registry refresh.
//!
//! Runs [`RegistryStore::refresh`] on a fixed interval. The first tick is
//! consumed immediately so the first refresh happens one interval after
//! spawning; callers that want a refresh at startup do it themselves.

use ddcheck_registry::RegistryStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Spawns the refresh loop. Abort the returned handle to stop it.
pub fn spawn_registry_refresh(store: Arc<RegistryStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        run_refresh_loop(store, every).await;
    })
}

async fn run_refresh_loop(store: Arc<RegistryStore>, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;

    info!(interval_secs = every.as_secs(), "Registry refresh task started");

    loop {
        ticker.tick().await;
        debug!("Scheduled registry refresh");
        match store.refresh().await {
            Ok(count) => info!(entries = count, "Scheduled registry refresh finished"),
            Err(e) => warn!(error = %e, "Scheduled registry refresh failed"),
        }
    }
}
