pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::analyzer::handlers as analyzer;
use crate::applications::handlers as applications;
use crate::profiles::handlers as profiles;
use crate::reminders::handlers as reminders;
use crate::state::AppState;

/// Room for a resume PDF or avatar plus the other multipart fields.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Applications
        .route(
            "/api/v1/applications",
            get(applications::handle_list).post(applications::handle_create),
        )
        .route("/api/v1/applications/stats", get(applications::handle_stats))
        .route(
            "/api/v1/applications/:id",
            patch(applications::handle_update).delete(applications::handle_delete),
        )
        // Profile
        .route(
            "/api/v1/profile",
            get(profiles::handle_get_profile).put(profiles::handle_upsert_profile),
        )
        .route("/api/v1/profile/whatsapp", patch(profiles::handle_update_whatsapp))
        .route("/api/v1/profile/image", post(profiles::handle_upload_image))
        // Resume analyzer
        .route(
            "/api/v1/analyses",
            get(analyzer::handle_history).post(analyzer::handle_analyze),
        )
        .route("/api/v1/analyses/upload", post(analyzer::handle_analyze_upload))
        .route("/api/v1/analyses/improve", post(analyzer::handle_improve))
        .route("/api/v1/analyses/:id", get(analyzer::handle_get_analysis))
        // Reminders
        .route("/api/cron/send-reminders", get(reminders::handle_send_reminders))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use aws_config::{BehaviorVersion, Region};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::analyzer::memory::InMemoryAnalysisStore;
    use crate::applications::memory::{application, InMemoryApplicationStore};
    use crate::auth::AUTH_HEADER;
    use crate::config::{Config, ReminderConfig};
    use crate::llm_client::LlmClient;
    use crate::profiles::memory::InMemoryProfileStore;
    use crate::reminders::scheduler::ReminderScheduler;
    use crate::reminders::thresholds::ReminderThresholds;

    fn test_config(cron_secret: Option<&str>) -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            redis_url: "redis://unused".to_string(),
            s3_bucket: "placement-alarm".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            gemini_api_key: "test".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            reminders: ReminderConfig {
                thresholds: ReminderThresholds::default(),
                display_timezone: chrono_tz::Asia::Kolkata,
                interval: None,
                run_timeout: Duration::from_secs(30),
                concurrency: 2,
                cron_secret: cron_secret.map(String::from),
            },
            email: None,
            whatsapp: None,
        }
    }

    fn test_state(
        applications: Arc<InMemoryApplicationStore>,
        cron_secret: Option<&str>,
    ) -> AppState {
        let config = test_config(cron_secret);
        let profiles = Arc::new(InMemoryProfileStore::new());
        let s3 = aws_sdk_s3::Client::from_conf(
            aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new("us-east-1"))
                .build(),
        );
        let reminders = Arc::new(ReminderScheduler::new(
            config.reminders.clone(),
            applications.clone(),
            profiles.clone(),
        ));
        AppState {
            applications,
            profiles,
            analyses: Arc::new(InMemoryAnalysisStore::new()),
            s3,
            llm: LlmClient::new("test".to_string()),
            config,
            reminders,
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(AUTH_HEADER, user);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(Arc::new(InMemoryApplicationStore::new()), None));
        let response = app.oneshot(request("GET", "/health", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_applications_require_principal() {
        let app = build_router(test_state(Arc::new(InMemoryApplicationStore::new()), None));
        let response = app
            .oneshot(request("GET", "/api/v1/applications", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_then_list_scoped_to_owner() {
        let store = Arc::new(InMemoryApplicationStore::new());
        let app = build_router(test_state(store.clone(), None));

        let created = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/applications",
                Some("user-1"),
                Some(json!({
                    "name": "Globex",
                    "role": "SDE Intern",
                    "package": "1.2 LPA stipend",
                    "drive_type": "Off-Campus",
                    "type": "Internship",
                    "deadline": "2026-11-01T12:00:00Z"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = body_json(created).await;
        assert_eq!(created["status"], "Not Applied");
        assert_eq!(created["reminders_sent"], 0);
        assert_eq!(created["type"], "Internship");

        let mine = app
            .clone()
            .oneshot(request("GET", "/api/v1/applications", Some("user-1"), None))
            .await
            .unwrap();
        assert_eq!(body_json(mine).await.as_array().unwrap().len(), 1);

        let theirs = app
            .oneshot(request("GET", "/api/v1/applications", Some("user-2"), None))
            .await
            .unwrap();
        assert!(body_json(theirs).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_other_users_record_is_not_found() {
        let store = Arc::new(InMemoryApplicationStore::new());
        let record = application("user-1", None, 0);
        store.insert(record.clone());
        let app = build_router(test_state(store.clone(), None));

        let uri = format!("/api/v1/applications/{}", record.id);
        let response = app
            .clone()
            .oneshot(request("DELETE", &uri, Some("user-2"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(store.get(record.id).is_some());

        let response = app
            .oneshot(request("DELETE", &uri, Some("user-1"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(store.get(record.id).is_none());
    }

    #[tokio::test]
    async fn test_cron_trigger_returns_summary_uncached() {
        let store = Arc::new(InMemoryApplicationStore::new());
        store.insert(application("user-1", Some(Utc::now() + chrono::Duration::hours(2)), 0));
        let app = build_router(test_state(store, None));

        let response = app
            .oneshot(request("GET", "/api/cron/send-reminders", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(body_json(response).await, json!({"sent": 1, "checked": 1}));
    }

    #[tokio::test]
    async fn test_cron_trigger_checks_secret() {
        let app = build_router(test_state(
            Arc::new(InMemoryApplicationStore::new()),
            Some("s3cret"),
        ));

        let response = app
            .clone()
            .oneshot(request("GET", "/api/cron/send-reminders", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");

        let authorized = Request::builder()
            .uri("/api/cron/send-reminders")
            .header(header::AUTHORIZATION, "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(authorized).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cron_trigger_query_failure_is_500() {
        let store = Arc::new(InMemoryApplicationStore::new());
        store.fail_queries();
        let app = build_router(test_state(store, None));

        let response = app
            .oneshot(request("GET", "/api/cron/send-reminders", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert!(body_json(response).await["error"]["code"].is_string());
    }
}
