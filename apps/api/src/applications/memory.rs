//! In-memory `ApplicationStore` for tests, with failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::applications::models::{
    ApplicationFilter, DetailsPatch, DueCandidateQuery, MarkOutcome, NewApplication,
};
use crate::applications::store::ApplicationStore;
use crate::auth::Principal;
use crate::models::application::{ApplicationRow, STATUS_NOT_APPLIED};
use crate::store::StoreError;

#[derive(Default)]
pub struct InMemoryApplicationStore {
    rows: Mutex<HashMap<Uuid, ApplicationRow>>,
    fail_queries: AtomicBool,
    fail_increments_for: Mutex<HashSet<Uuid>>,
    increment_calls: AtomicUsize,
}

impl InMemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, row: ApplicationRow) {
        self.rows.lock().unwrap().insert(row.id, row);
    }

    pub fn get(&self, id: Uuid) -> Option<ApplicationRow> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn remove(&self, id: Uuid) {
        self.rows.lock().unwrap().remove(&id);
    }

    pub fn fail_queries(&self) {
        self.fail_queries.store(true, Ordering::SeqCst);
    }

    pub fn fail_increments_for(&self, id: Uuid) {
        self.fail_increments_for.lock().unwrap().insert(id);
    }

    pub fn increment_calls(&self) -> usize {
        self.increment_calls.load(Ordering::SeqCst)
    }
}

/// A "Not Applied" record owned by `owner` with the given deadline.
pub fn application(
    owner: &str,
    deadline: Option<DateTime<Utc>>,
    reminders_sent: i32,
) -> ApplicationRow {
    let now = Utc::now();
    ApplicationRow {
        id: Uuid::new_v4(),
        owner_id: owner.to_string(),
        name: "Acme Corp".to_string(),
        role: "Backend Engineer".to_string(),
        package: "18 LPA".to_string(),
        drive_type: "On-Campus".to_string(),
        kind: "Full-time".to_string(),
        deadline,
        link: None,
        status: STATUS_NOT_APPLIED.to_string(),
        notes: None,
        status_updated_at: None,
        reminders_sent,
        last_reminder_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn create(
        &self,
        owner: &Principal,
        new: NewApplication,
    ) -> Result<ApplicationRow, StoreError> {
        let mut row = application(&owner.user_id, new.deadline, 0);
        row.status = new.status_or_default().to_string();
        row.name = new.name;
        row.role = new.role;
        row.package = new.package;
        row.drive_type = new.drive_type;
        row.kind = new.kind;
        row.link = new.link;
        self.insert(row.clone());
        Ok(row)
    }

    async fn list(
        &self,
        owner: &Principal,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.owner_id == owner.user_id)
            .filter(|r| {
                search.as_deref().map_or(true, |s| {
                    r.name.to_lowercase().contains(s) || r.role.to_lowercase().contains(s)
                })
            })
            .filter(|r| filter.status.as_deref().map_or(true, |s| r.status == s))
            .filter(|r| filter.drive_type.as_deref().map_or(true, |d| r.drive_type == d))
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.deadline.is_none(), r.deadline));
        Ok(rows)
    }

    async fn update_details(
        &self,
        owner: &Principal,
        id: Uuid,
        patch: &DetailsPatch,
    ) -> Result<Option<ApplicationRow>, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.get_mut(&id).filter(|r| r.owner_id == owner.user_id) else {
            return Ok(None);
        };
        if let Some(status) = &patch.status {
            row.status = status.clone();
        }
        if patch.status_updated_at.is_some() {
            row.status_updated_at = patch.status_updated_at;
        }
        if patch.notes.is_some() {
            row.notes = patch.notes.clone();
        }
        if patch.deadline.is_some() {
            row.deadline = patch.deadline;
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, owner: &Principal, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.get(&id).is_some_and(|r| r.owner_id == owner.user_id) {
            rows.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn query_due_candidates(
        &self,
        query: &DueCandidateQuery,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("query rejected".to_string()));
        }
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.status == query.status)
            .filter(|r| r.deadline.is_some_and(|d| d <= query.deadline_before))
            .filter(|r| r.reminders_sent < query.reminders_sent_less_than)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.deadline);
        Ok(rows)
    }

    async fn increment_reminder_count(
        &self,
        id: Uuid,
        expected_sent: i32,
        at: DateTime<Utc>,
    ) -> Result<MarkOutcome, StoreError> {
        self.increment_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_increments_for.lock().unwrap().contains(&id) {
            return Err(StoreError::Unavailable("patch rejected".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(row) if row.reminders_sent == expected_sent => {
                row.reminders_sent += 1;
                row.last_reminder_at = Some(at);
                Ok(MarkOutcome::Marked)
            }
            _ => Ok(MarkOutcome::Stale),
        }
    }
}
