use std::sync::Arc;
use std::time::Duration;

use optistock_import::RecordSource;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::orchestrator::Orchestrator;

/// Periodic background refresh. The first tick fires one full period after
/// start; start-up does its own fetch.
pub fn spawn_refresh_loop<S>(orch: Arc<Orchestrator<S>>, every: Duration) -> JoinHandle<()>
where
    S: RecordSource + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            tracing::debug!("refresh tick");
            let outcome = orch.on_refresh_tick().await;
            tracing::debug!(?outcome, "refresh tick done");
        }
    })
}
