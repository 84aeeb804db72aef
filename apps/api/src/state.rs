use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use crate::analyzer::store::AnalysisStore;
use crate::applications::store::ApplicationStore;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::profiles::store::ProfileStore;
use crate::reminders::scheduler::ReminderScheduler;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub applications: Arc<dyn ApplicationStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub analyses: Arc<dyn AnalysisStore>,
    /// Profile images live in S3 / MinIO.
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    /// Shared with the interval job when one is running.
    pub reminders: Arc<ReminderScheduler>,
}
