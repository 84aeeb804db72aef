use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::applications::models::{
    ApplicationFilter, DetailsPatch, DueCandidateQuery, MarkOutcome, NewApplication,
};
use crate::auth::Principal;
use crate::models::application::ApplicationRow;
use crate::store::{bounded, StoreError};

/// Persistence seam for tracked applications.
///
/// Carried in `AppState` as `Arc<dyn ApplicationStore>`. Every user-facing
/// call is scoped to the owning `Principal`; the reminder calls are not.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn create(
        &self,
        owner: &Principal,
        new: NewApplication,
    ) -> Result<ApplicationRow, StoreError>;

    async fn list(
        &self,
        owner: &Principal,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRow>, StoreError>;

    /// Returns `None` when the id does not exist or belongs to someone else.
    async fn update_details(
        &self,
        owner: &Principal,
        id: Uuid,
        patch: &DetailsPatch,
    ) -> Result<Option<ApplicationRow>, StoreError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, owner: &Principal, id: Uuid) -> Result<bool, StoreError>;

    /// Records with `status == query.status`, a deadline at or before
    /// `query.deadline_before`, and fewer than `query.reminders_sent_less_than`
    /// reminders sent.
    async fn query_due_candidates(
        &self,
        query: &DueCandidateQuery,
    ) -> Result<Vec<ApplicationRow>, StoreError>;

    /// Increments `reminders_sent` and stamps `last_reminder_at`, only if the
    /// row still has `expected_sent` reminders recorded.
    async fn increment_reminder_count(
        &self,
        id: Uuid,
        expected_sent: i32,
        at: DateTime<Utc>,
    ) -> Result<MarkOutcome, StoreError>;
}

pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn create(
        &self,
        owner: &Principal,
        new: NewApplication,
    ) -> Result<ApplicationRow, StoreError> {
        let status = new.status_or_default().to_string();
        bounded(
            sqlx::query_as::<_, ApplicationRow>(
                r#"
                INSERT INTO applications
                    (id, owner_id, name, role, package, drive_type, kind,
                     deadline, link, status, reminders_sent)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&owner.user_id)
            .bind(&new.name)
            .bind(&new.role)
            .bind(&new.package)
            .bind(&new.drive_type)
            .bind(&new.kind)
            .bind(new.deadline)
            .bind(&new.link)
            .bind(status)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn list(
        &self,
        owner: &Principal,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        let pattern = filter.search.as_deref().map(like_pattern);
        bounded(
            sqlx::query_as::<_, ApplicationRow>(
                r#"
                SELECT * FROM applications
                WHERE owner_id = $1
                  AND ($2::text IS NULL OR name ILIKE $2 OR role ILIKE $2)
                  AND ($3::text IS NULL OR status = $3)
                  AND ($4::text IS NULL OR drive_type = $4)
                ORDER BY deadline ASC NULLS LAST, created_at DESC
                "#,
            )
            .bind(&owner.user_id)
            .bind(pattern)
            .bind(&filter.status)
            .bind(&filter.drive_type)
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn update_details(
        &self,
        owner: &Principal,
        id: Uuid,
        patch: &DetailsPatch,
    ) -> Result<Option<ApplicationRow>, StoreError> {
        bounded(
            sqlx::query_as::<_, ApplicationRow>(
                r#"
                UPDATE applications SET
                    status            = COALESCE($3, status),
                    status_updated_at = COALESCE($4, status_updated_at),
                    notes             = COALESCE($5, notes),
                    deadline          = COALESCE($6, deadline),
                    updated_at        = now()
                WHERE id = $1 AND owner_id = $2
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(&owner.user_id)
            .bind(&patch.status)
            .bind(patch.status_updated_at)
            .bind(&patch.notes)
            .bind(patch.deadline)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn delete(&self, owner: &Principal, id: Uuid) -> Result<bool, StoreError> {
        let result = bounded(
            sqlx::query("DELETE FROM applications WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(&owner.user_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn query_due_candidates(
        &self,
        query: &DueCandidateQuery,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        bounded(
            sqlx::query_as::<_, ApplicationRow>(
                r#"
                SELECT * FROM applications
                WHERE status = $1
                  AND deadline IS NOT NULL
                  AND deadline <= $2
                  AND reminders_sent < $3
                ORDER BY deadline ASC
                "#,
            )
            .bind(query.status)
            .bind(query.deadline_before)
            .bind(query.reminders_sent_less_than)
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn increment_reminder_count(
        &self,
        id: Uuid,
        expected_sent: i32,
        at: DateTime<Utc>,
    ) -> Result<MarkOutcome, StoreError> {
        // Compare-and-swap on the pre-read count: overlapping runs and
        // deletions both surface as zero affected rows.
        let result = bounded(
            sqlx::query(
                r#"
                UPDATE applications
                SET reminders_sent = reminders_sent + 1,
                    last_reminder_at = $3
                WHERE id = $1 AND reminders_sent = $2
                "#,
            )
            .bind(id)
            .bind(expected_sent)
            .bind(at)
            .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            debug!(application_id = %id, expected_sent, "reminder count already advanced");
            return Ok(MarkOutcome::Stale);
        }
        Ok(MarkOutcome::Marked)
    }
}

/// Builds an ILIKE substring pattern, escaping the wildcard characters.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
