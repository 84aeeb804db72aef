//! In-memory `ProfileStore` for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::auth::Principal;
use crate::models::profile::{ContactProfile, ProfileRow};
use crate::profiles::store::{ProfileStore, ProfileUpsert};
use crate::store::StoreError;

#[derive(Default)]
pub struct InMemoryProfileStore {
    rows: Mutex<HashMap<String, ProfileRow>>,
    failing_owners: Mutex<HashSet<String>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contact(self, owner_id: &str, email: Option<&str>, whatsapp: Option<&str>) -> Self {
        let now = Utc::now();
        self.rows.lock().unwrap().insert(
            owner_id.to_string(),
            ProfileRow {
                user_id: owner_id.to_string(),
                name: "Test User".to_string(),
                email: email.map(String::from),
                whatsapp_number: whatsapp.map(String::from),
                profile_image: None,
                created_at: now,
                updated_at: now,
            },
        );
        self
    }

    pub fn fail_lookups_for(&self, owner_id: &str) {
        self.failing_owners
            .lock()
            .unwrap()
            .insert(owner_id.to_string());
    }

    fn patch(
        &self,
        owner: &Principal,
        apply: impl FnOnce(&mut ProfileRow),
    ) -> Option<ProfileRow> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&owner.user_id)?;
        apply(row);
        row.updated_at = Utc::now();
        Some(row.clone())
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn upsert(
        &self,
        owner: &Principal,
        profile: &ProfileUpsert,
    ) -> Result<ProfileRow, StoreError> {
        let now = Utc::now();
        let mut rows = self.rows.lock().unwrap();
        let created_at = rows
            .get(&owner.user_id)
            .map(|r| r.created_at)
            .unwrap_or(now);
        let row = ProfileRow {
            user_id: owner.user_id.clone(),
            name: profile.name.clone(),
            email: Some(profile.email.clone()),
            whatsapp_number: profile.whatsapp_number.clone(),
            profile_image: profile.profile_image.clone(),
            created_at,
            updated_at: now,
        };
        rows.insert(owner.user_id.clone(), row.clone());
        Ok(row)
    }

    async fn get(&self, owner: &Principal) -> Result<Option<ProfileRow>, StoreError> {
        Ok(self.rows.lock().unwrap().get(&owner.user_id).cloned())
    }

    async fn update_whatsapp(
        &self,
        owner: &Principal,
        number: &str,
    ) -> Result<Option<ProfileRow>, StoreError> {
        Ok(self.patch(owner, |row| row.whatsapp_number = Some(number.to_string())))
    }

    async fn update_image(
        &self,
        owner: &Principal,
        image_url: &str,
    ) -> Result<Option<ProfileRow>, StoreError> {
        Ok(self.patch(owner, |row| row.profile_image = Some(image_url.to_string())))
    }

    async fn contact_for(&self, owner_id: &str) -> Result<ContactProfile, StoreError> {
        if self.failing_owners.lock().unwrap().contains(owner_id) {
            return Err(StoreError::Unavailable("profile lookup rejected".to_string()));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(owner_id)
            .cloned()
            .map(ContactProfile::from)
            .unwrap_or_default())
    }
}
