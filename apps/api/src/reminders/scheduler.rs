use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{future, stream, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::applications::models::{DueCandidateQuery, MarkOutcome};
use crate::applications::store::ApplicationStore;
use crate::config::ReminderConfig;
use crate::models::application::{ApplicationRow, STATUS_NOT_APPLIED};
use crate::models::profile::ContactProfile;
use crate::notify::{ChatSender, EmailSender, NotifyError, CHANNEL_TIMEOUT};
use crate::profiles::store::ProfileStore;
use crate::reminders::lease::RunLock;
use crate::reminders::message::compose;
use crate::reminders::thresholds::ReminderThresholds;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ReminderError {
    /// The candidate query failed; nothing was processed.
    #[error("failed to load reminder candidates: {0}")]
    Query(#[source] StoreError),
}

/// Result of one run, returned to the trigger as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub sent: usize,
    pub checked: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

impl RunSummary {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// A candidate that should receive reminder `reminder_index` in this run.
#[derive(Debug, Clone, PartialEq)]
pub struct DueReminder {
    pub record: ApplicationRow,
    pub reminder_index: usize,
    pub hours_until_deadline: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOutcome {
    Sent,
    Failed,
    /// No address on the profile, or the channel is not configured.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub email: ChannelOutcome,
    pub chat: ChannelOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordOutcome {
    Marked,
    Stale,
    Failed,
}

fn hours_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (deadline - now).num_milliseconds() as f64 / 3_600_000.0
}

/// The index of the reminder `record` should receive at `now`, if any.
///
/// Only the next unsent index is ever considered, so a record that is past
/// several thresholds (or past its deadline) gets exactly one reminder per run.
pub fn reminder_index_if_due(
    record: &ApplicationRow,
    now: DateTime<Utc>,
    thresholds: &ReminderThresholds,
) -> Option<usize> {
    if !record.is_not_applied() {
        return None;
    }
    let deadline = record.deadline?;
    let index = usize::try_from(record.reminders_sent).ok()?;
    let threshold = thresholds.get(index)?;
    (hours_until(deadline, now) <= threshold).then_some(index)
}

/// Periodic deadline reminders for applications still marked "Not Applied".
pub struct ReminderScheduler {
    config: ReminderConfig,
    applications: Arc<dyn ApplicationStore>,
    profiles: Arc<dyn ProfileStore>,
    email: Option<Arc<dyn EmailSender>>,
    chat: Option<Arc<dyn ChatSender>>,
    lease: Option<Arc<dyn RunLock>>,
}

impl ReminderScheduler {
    pub fn new(
        config: ReminderConfig,
        applications: Arc<dyn ApplicationStore>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            config,
            applications,
            profiles,
            email: None,
            chat: None,
            lease: None,
        }
    }

    pub fn with_email(mut self, sender: Arc<dyn EmailSender>) -> Self {
        self.email = Some(sender);
        self
    }

    pub fn with_chat(mut self, sender: Arc<dyn ChatSender>) -> Self {
        self.chat = Some(sender);
        self
    }

    pub fn with_lease(mut self, lease: impl RunLock + 'static) -> Self {
        self.lease = Some(Arc::new(lease));
        self
    }

    pub fn thresholds(&self) -> &ReminderThresholds {
        &self.config.thresholds
    }

    /// Filters a candidate snapshot down to the records due at `now`.
    ///
    /// Every rule is re-checked here; the store's filter only narrows the read.
    pub fn select_due(
        &self,
        now: DateTime<Utc>,
        candidates: Vec<ApplicationRow>,
    ) -> impl Iterator<Item = DueReminder> + '_ {
        candidates.into_iter().filter_map(move |record| {
            let reminder_index = reminder_index_if_due(&record, now, &self.config.thresholds)?;
            let hours_until_deadline = record.deadline.map_or(0.0, |d| hours_until(d, now));
            Some(DueReminder {
                record,
                reminder_index,
                hours_until_deadline,
            })
        })
    }

    /// Sends the reminder on every channel the contact has. Channel failures
    /// are logged and reported in the outcome, never returned.
    pub async fn deliver(&self, due: &DueReminder, contact: &ContactProfile) -> DeliveryOutcome {
        let id = due.record.id;
        let message = compose(&due.record, due.reminder_index, self.config.display_timezone);

        let email = async {
            match (self.email.as_ref(), contact.email.as_deref()) {
                (Some(sender), Some(to)) => {
                    let result =
                        timeout(CHANNEL_TIMEOUT, sender.send(to, &message.subject, &message.html))
                            .await;
                    channel_outcome("email", id, result)
                }
                (None, Some(_)) => {
                    debug!(application_id = %id, "email channel not configured");
                    ChannelOutcome::Skipped
                }
                _ => ChannelOutcome::Skipped,
            }
        };

        let chat = async {
            match (self.chat.as_ref(), contact.whatsapp_number.as_deref()) {
                (Some(sender), Some(to)) => {
                    let result = timeout(CHANNEL_TIMEOUT, sender.send(to, &message.text)).await;
                    channel_outcome("whatsapp", id, result)
                }
                (None, Some(_)) => {
                    debug!(application_id = %id, "whatsapp channel not configured");
                    ChannelOutcome::Skipped
                }
                _ => ChannelOutcome::Skipped,
            }
        };

        let (email, chat) = tokio::join!(email, chat);
        DeliveryOutcome { email, chat }
    }

    /// Advances the record's reminder count, conditional on nobody having
    /// advanced it since it was read.
    pub async fn mark_sent(
        &self,
        record: &ApplicationRow,
        now: DateTime<Utc>,
    ) -> Result<MarkOutcome, StoreError> {
        self.applications
            .increment_reminder_count(record.id, record.reminders_sent, now)
            .await
    }

    async fn process(&self, due: DueReminder, now: DateTime<Utc>) -> RecordOutcome {
        let id = due.record.id;

        let contact = match self.profiles.contact_for(&due.record.owner_id).await {
            Ok(contact) => contact,
            Err(e) => {
                warn!(
                    application_id = %id,
                    error = %e,
                    "profile lookup failed; treating as no contact"
                );
                ContactProfile::default()
            }
        };
        if !contact.has_any_channel() {
            warn!(
                application_id = %id,
                owner = %due.record.owner_id,
                "no contact channel on profile; reminder will be marked sent undelivered"
            );
        }

        let delivery = self.deliver(&due, &contact).await;
        info!(
            application_id = %id,
            reminder = due.reminder_index + 1,
            hours_until_deadline = %format!("{:.2}", due.hours_until_deadline),
            email = ?delivery.email,
            whatsapp = ?delivery.chat,
            "reminder processed"
        );

        match self.mark_sent(&due.record, now).await {
            Ok(MarkOutcome::Marked) => RecordOutcome::Marked,
            Ok(MarkOutcome::Stale) => {
                info!(application_id = %id, "reminder already recorded by another run");
                RecordOutcome::Stale
            }
            Err(e) => {
                error!(application_id = %id, error = %e, "failed to record reminder");
                RecordOutcome::Failed
            }
        }
    }

    /// One full pass: query, select, then deliver and mark each due record.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunSummary, ReminderError> {
        let thresholds = &self.config.thresholds;
        let query = DueCandidateQuery {
            status: STATUS_NOT_APPLIED,
            deadline_before: now
                .checked_add_signed(thresholds.window())
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            reminders_sent_less_than: i32::try_from(thresholds.count()).unwrap_or(i32::MAX),
        };

        let candidates = self
            .applications
            .query_due_candidates(&query)
            .await
            .map_err(ReminderError::Query)?;
        let checked = candidates.len();

        let started = Instant::now();
        let run_timeout = self.config.run_timeout;

        let outcomes: Vec<RecordOutcome> = stream::iter(self.select_due(now, candidates))
            .take_while(|due| {
                let in_time = started.elapsed() < run_timeout;
                if !in_time {
                    warn!(
                        application_id = %due.record.id,
                        timeout_secs = run_timeout.as_secs(),
                        "run timeout reached; remaining reminders left for the next run"
                    );
                }
                future::ready(in_time)
            })
            .map(|due| self.process(due, now))
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        let sent = outcomes
            .iter()
            .filter(|o| **o == RecordOutcome::Marked)
            .count();
        let failed = outcomes
            .iter()
            .filter(|o| **o == RecordOutcome::Failed)
            .count();

        info!(
            sent,
            checked,
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reminder run finished"
        );
        Ok(RunSummary {
            sent,
            checked,
            skipped: false,
        })
    }

    /// [`Self::run`] under the Redis lease. A held lease skips the run; an
    /// unreachable Redis does not, since `mark_sent` is conditional.
    pub async fn run_guarded(&self, now: DateTime<Utc>) -> Result<RunSummary, ReminderError> {
        let Some(lease) = &self.lease else {
            return self.run(now).await;
        };

        let token = match lease.acquire().await {
            Ok(Some(token)) => Some(token),
            Ok(None) => {
                info!("another reminder run is in progress; skipping");
                return Ok(RunSummary::skipped());
            }
            Err(e) => {
                warn!(error = %e, "could not take reminder lease; running unguarded");
                None
            }
        };

        let result = self.run(now).await;
        if let Some(token) = token {
            lease.release(token).await;
        }
        result
    }
}

fn channel_outcome(
    channel: &'static str,
    id: Uuid,
    result: Result<Result<(), NotifyError>, tokio::time::error::Elapsed>,
) -> ChannelOutcome {
    match result {
        Ok(Ok(())) => ChannelOutcome::Sent,
        Ok(Err(e)) => {
            error!(application_id = %id, channel, error = %e, "reminder delivery failed");
            ChannelOutcome::Failed
        }
        Err(_) => {
            let e = NotifyError::Timeout(CHANNEL_TIMEOUT);
            error!(application_id = %id, channel, error = %e, "reminder delivery failed");
            ChannelOutcome::Failed
        }
    }
}
