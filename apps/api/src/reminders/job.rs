use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::reminders::scheduler::ReminderScheduler;

/// Runs the scheduler every `period` in the background. The first run
/// happens immediately; ticks missed while a run is still going are skipped.
pub fn start_reminder_job(scheduler: Arc<ReminderScheduler>, period: Duration) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), "starting in-process reminder job");
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match scheduler.run_guarded(Utc::now()).await {
                Ok(summary) => info!(
                    sent = summary.sent,
                    checked = summary.checked,
                    skipped = summary.skipped,
                    "scheduled reminder run complete"
                ),
                Err(e) => error!(error = %e, "scheduled reminder run failed"),
            }
        }
    })
}
