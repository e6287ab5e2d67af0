//! Cron-driven aggregation runs using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (cron schedule, default hourly)
//!     │
//!     └─► Aggregator::run_once()
//!             └─► failed runs are logged; the previous snapshot stays in place
//! ```
//!
//! Schedules use six fields with seconds first, e.g. `0 */30 * * * *`.

use crate::aggregator::Aggregator;
use crate::error::RunError;
use crate::scrapers::fetch::Fetch;
use crate::store::SnapshotStore;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Register the aggregation job on `schedule` and start the scheduler.
pub async fn start_scheduler<F, S>(
    aggregator: Arc<Aggregator<F, S>>,
    schedule: &str,
    cancel: CancellationToken,
) -> Result<JobScheduler, JobSchedulerError>
where
    F: Fetch + 'static,
    S: SnapshotStore + 'static,
{
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let aggregator = Arc::clone(&aggregator);
        let cancel = cancel.clone();
        Box::pin(async move {
            match aggregator.run_once(&cancel).await {
                Ok(_) => {}
                Err(RunError::AlreadyRunning) => {
                    warn!("Previous run still in progress; skipping this trigger");
                }
                Err(e) => {
                    error!(error = %e, "Scheduled hot topic run failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!(schedule, "Scheduled hot topic runs");
    Ok(scheduler)
}
