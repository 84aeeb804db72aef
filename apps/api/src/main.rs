mod analyzer;
mod applications;
mod auth;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod notify;
mod profiles;
mod reminders;
mod routes;
mod state;
mod store;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analyzer::store::PgAnalysisStore;
use crate::applications::store::PgApplicationStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::notify::email::HttpEmailSender;
use crate::notify::whatsapp::TwilioWhatsAppSender;
use crate::profiles::store::PgProfileStore;
use crate::reminders::job::start_reminder_job;
use crate::reminders::lease::RunLease;
use crate::reminders::scheduler::ReminderScheduler;
use crate::routes::build_router;
use crate::state::AppState;

/// Extra lease lifetime on top of the run timeout.
const LEASE_GRACE: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Placement Alarm API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let applications = Arc::new(PgApplicationStore::new(db.clone()));
    let profiles = Arc::new(PgProfileStore::new(db.clone()));
    let analyses = Arc::new(PgAnalysisStore::new(db));

    // Initialize Redis (reminder run lease)
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Reminder scheduler and its delivery channels
    let reminder_config = config.reminders.clone();
    let mut scheduler = ReminderScheduler::new(
        reminder_config.clone(),
        applications.clone(),
        profiles.clone(),
    )
    .with_lease(RunLease::new(redis, reminder_config.run_timeout + LEASE_GRACE));
    match config.email.clone() {
        Some(email) => scheduler = scheduler.with_email(Arc::new(HttpEmailSender::new(email))),
        None => {
            warn!("EMAIL_API_URL / EMAIL_API_KEY / EMAIL_FROM not set; email reminders disabled")
        }
    }
    match config.whatsapp.clone() {
        Some(whatsapp) => {
            scheduler = scheduler.with_chat(Arc::new(TwilioWhatsAppSender::new(whatsapp)))
        }
        None => warn!(
            "TWILIO_SID / TWILIO_TOKEN / TWILIO_WHATSAPP_FROM not set; WhatsApp reminders disabled"
        ),
    }
    let reminders = Arc::new(scheduler);
    info!(
        thresholds = %reminders.thresholds(),
        timezone = %reminder_config.display_timezone,
        "Reminder scheduler initialized"
    );

    if let Some(period) = reminder_config.interval {
        start_reminder_job(reminders.clone(), period);
    }

    // Build app state
    let state = AppState {
        applications,
        profiles,
        analyses,
        s3,
        llm,
        config: config.clone(),
        reminders,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web app's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
/// Path-style addressing keeps image URLs valid against MinIO.
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "placement-alarm-static",
    );

    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}
