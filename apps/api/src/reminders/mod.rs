//! Deadline reminders.
//!
//! A run reads every "Not Applied" application whose deadline falls inside
//! the largest threshold (or has already passed), sends the next unsent
//! reminder by email and WhatsApp, and advances the record's reminder count.
//! Runs are triggered by the cron endpoint or by the optional interval job.

pub mod handlers;
pub mod job;
pub mod lease;
pub mod message;
pub mod scheduler;
pub mod thresholds;
