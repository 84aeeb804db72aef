use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::Principal;
use crate::models::profile::{ContactProfile, ProfileRow};
use crate::store::{bounded, StoreError};

/// Body of `PUT /api/v1/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpsert {
    pub name: String,
    pub email: String,
    pub whatsapp_number: Option<String>,
    pub profile_image: Option<String>,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn upsert(&self, owner: &Principal, profile: &ProfileUpsert)
        -> Result<ProfileRow, StoreError>;

    async fn get(&self, owner: &Principal) -> Result<Option<ProfileRow>, StoreError>;

    /// Returns `None` when the user has no profile yet.
    async fn update_whatsapp(
        &self,
        owner: &Principal,
        number: &str,
    ) -> Result<Option<ProfileRow>, StoreError>;

    async fn update_image(
        &self,
        owner: &Principal,
        image_url: &str,
    ) -> Result<Option<ProfileRow>, StoreError>;

    /// Delivery channels for the owner of an application. Not principal-scoped:
    /// only the reminder scheduler calls this.
    async fn contact_for(&self, owner_id: &str) -> Result<ContactProfile, StoreError>;
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn upsert(
        &self,
        owner: &Principal,
        profile: &ProfileUpsert,
    ) -> Result<ProfileRow, StoreError> {
        bounded(
            sqlx::query_as::<_, ProfileRow>(
                r#"
                INSERT INTO profiles (user_id, name, email, whatsapp_number, profile_image)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id) DO UPDATE SET
                    name            = EXCLUDED.name,
                    email           = EXCLUDED.email,
                    whatsapp_number = EXCLUDED.whatsapp_number,
                    profile_image   = EXCLUDED.profile_image,
                    updated_at      = now()
                RETURNING *
                "#,
            )
            .bind(&owner.user_id)
            .bind(&profile.name)
            .bind(&profile.email)
            .bind(&profile.whatsapp_number)
            .bind(&profile.profile_image)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn get(&self, owner: &Principal) -> Result<Option<ProfileRow>, StoreError> {
        bounded(
            sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = $1")
                .bind(&owner.user_id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn update_whatsapp(
        &self,
        owner: &Principal,
        number: &str,
    ) -> Result<Option<ProfileRow>, StoreError> {
        bounded(
            sqlx::query_as::<_, ProfileRow>(
                "UPDATE profiles SET whatsapp_number = $2, updated_at = now() WHERE user_id = $1 RETURNING *",
            )
            .bind(&owner.user_id)
            .bind(number)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn update_image(
        &self,
        owner: &Principal,
        image_url: &str,
    ) -> Result<Option<ProfileRow>, StoreError> {
        bounded(
            sqlx::query_as::<_, ProfileRow>(
                "UPDATE profiles SET profile_image = $2, updated_at = now() WHERE user_id = $1 RETURNING *",
            )
            .bind(&owner.user_id)
            .bind(image_url)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn contact_for(&self, owner_id: &str) -> Result<ContactProfile, StoreError> {
        let row = bounded(
            sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = $1")
                .bind(owner_id)
                .fetch_optional(&self.pool),
        )
        .await?;
        Ok(row.map(ContactProfile::from).unwrap_or_default())
    }
}
