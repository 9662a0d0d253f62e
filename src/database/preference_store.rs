use async_trait::async_trait;
use sqlx::{types::Json, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::preference::Preference;

/// Persistence of named preference documents.
#[async_trait]
pub trait PreferenceStore: Send + Sync + 'static {
    async fn get(&self, id: &str) -> Result<Option<Preference>, DatabaseError>;

    /// Appends `item` to the list held by preference `id`, creating the
    /// preference when missing. A value already present is left alone.
    async fn add_to_list(&self, id: &str, item: &str) -> Result<Preference, DatabaseError>;
}

pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn get(&self, id: &str) -> Result<Option<Preference>, DatabaseError> {
        let row = sqlx::query_scalar::<_, Json<serde_json::Value>>("SELECT value FROM preferences WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|Json(value)| Preference {
            id: id.to_string(),
            value,
        }))
    }

    async fn add_to_list(&self, id: &str, item: &str) -> Result<Preference, DatabaseError> {
        let Json(value) = sqlx::query_scalar::<_, Json<serde_json::Value>>(
            "INSERT INTO preferences (id, value) VALUES ($1, jsonb_build_array($2::text)) \
             ON CONFLICT (id) DO UPDATE SET value = CASE \
                 WHEN jsonb_typeof(preferences.value) <> 'array' THEN jsonb_build_array($2::text) \
                 WHEN preferences.value @> jsonb_build_array($2::text) THEN preferences.value \
                 ELSE preferences.value || jsonb_build_array($2::text) END \
             RETURNING value",
        )
        .bind(id)
        .bind(item)
        .fetch_one(&self.pool)
        .await?;

        Ok(Preference {
            id: id.to_string(),
            value,
        })
    }
}
