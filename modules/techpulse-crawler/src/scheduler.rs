use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use techpulse_common::TechPulseError;

use crate::orchestrator::CrawlOrchestrator;

/// Start the fixed-interval crawl trigger.
///
/// Each tick awaits the full run before the next tick is considered, so
/// scheduled runs never overlap. A manual run holding the orchestrator's
/// guard just skips that tick. The first tick of `tokio::time::interval`
/// fires immediately and is consumed, so the first scheduled run happens
/// one full interval after startup.
pub fn start(orchestrator: Arc<CrawlOrchestrator>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        info!(
            interval_hours = interval.as_secs() / 3600,
            "Crawl scheduler started"
        );

        loop {
            ticker.tick().await;
            match orchestrator.run().await {
                Ok(stats) => info!("Scheduled crawl finished. {stats}"),
                Err(TechPulseError::CrawlInProgress) => {
                    info!("Scheduled crawl skipped, another run is in progress");
                }
                Err(e) => error!(error = %e, "Scheduled crawl failed"),
            }
        }
    })
}
