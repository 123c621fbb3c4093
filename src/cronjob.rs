//! Cronjob module for scheduled polling.
//!
//! In watch mode the feed is checked on a cron cadence equal to the lookback
//! window, so consecutive runs cover adjacent windows.

use std::sync::Arc;

use log::{error, info};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::feed::Frequency;
use crate::runner::FeedPoster;

/// Returns the cron expression (sec min hour day-of-month month day-of-week
/// year) that fires once per lookback window.
pub fn cron_expression(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Minute => "0 * * * * * *",
        Frequency::Hour => "0 0 * * * * *",
        Frequency::Day => "0 0 0 * * * *",
        Frequency::Week => "0 0 0 * * Mon *",
    }
}

/// Creates a job scheduler that runs `poster` on its frequency's cadence.
///
/// The scheduler is returned unstarted. Each tick performs a full,
/// independent run; a failing run is logged and the schedule continues.
///
/// # Errors
///
/// Fails if the scheduler cannot be created or the job cannot be added.
pub async fn start_feed_cronjob(
    poster: Arc<FeedPoster>,
) -> Result<JobScheduler, Box<dyn std::error::Error + Send + Sync>> {
    let sched = JobScheduler::new().await?;
    let schedule = cron_expression(poster.frequency());

    sched
        .add(Job::new_async(schedule, move |_uuid, _l| {
            let poster = Arc::clone(&poster);
            Box::pin(async move {
                info!("Starting scheduled feed check");
                match poster.run_once().await {
                    Ok(report) => {
                        info!(
                            "Scheduled feed check completed: {} posts, {} published, {} failed",
                            report.posts.len(),
                            report.published,
                            report.failed
                        );
                    }
                    Err(e) => {
                        error!("Scheduled feed check failed: {}", e);
                    }
                }
            })
        })?)
        .await?;

    info!("Cronjob scheduler configured with schedule '{}'", schedule);
    Ok(sched)
}

/// Starts the feed cronjob and keeps it running until Ctrl+C.
pub async fn run_feed_cronjob(
    poster: Arc<FeedPoster>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut sched = start_feed_cronjob(poster).await?;
    sched.start().await?;

    info!("Cronjob scheduler started successfully");

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal, stopping cronjob scheduler");

    sched.shutdown().await?;
    info!("Cronjob scheduler stopped");

    Ok(())
}
