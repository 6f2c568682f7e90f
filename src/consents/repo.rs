use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;

use crate::{
    db::{into_row, PgStore, StoreError},
    mapper::{field, FieldTable, Row},
};

pub static CONSENT_FIELDS: FieldTable = FieldTable {
    entity: "user consent",
    table: "user_consents",
    fields: &[
        field("id", "id"),
        field("user_id", "userId"),
        field("consent_type", "consentType"),
        field("granted", "granted"),
        field("platform", "platform"),
        field("created_at", "createdAt"),
        field("updated_at", "updatedAt"),
    ],
};

#[async_trait]
pub trait ConsentStore: Send + Sync {
    async fn list_consents(&self, user_id: &str) -> Result<Vec<Row>, StoreError>;

    /// Inserts the row, or overwrites `granted`, `platform` and `updated_at` of
    /// the existing `(user_id, consent_type)` row, in a single statement.
    /// Returns the row as stored afterwards.
    async fn upsert_consent(&self, row: Row) -> Result<Option<Row>, StoreError>;
}

#[async_trait]
impl ConsentStore for PgStore {
    async fn list_consents(&self, user_id: &str) -> Result<Vec<Row>, StoreError> {
        let sql = format!(
            "SELECT to_jsonb(r) FROM (SELECT {} FROM {} WHERE user_id = $1::uuid) r",
            CONSENT_FIELDS.columns(),
            CONSENT_FIELDS.table,
        );
        let rows = sqlx::query_scalar::<_, Value>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(into_row).collect()
    }

    async fn upsert_consent(&self, row: Row) -> Result<Option<Row>, StoreError> {
        // created_at takes the write time on insert only; updated_at never
        // moves backwards even if two writers' clocks disagree.
        let stored = sqlx::query_scalar::<_, Value>(
            r#"
            INSERT INTO user_consents AS c
                (user_id, consent_type, granted, platform, created_at, updated_at)
            SELECT w.user_id, w.consent_type, w.granted, w.platform, w.updated_at, w.updated_at
              FROM jsonb_populate_record(NULL::user_consents, $1) AS w
            ON CONFLICT (user_id, consent_type) DO UPDATE
               SET granted    = EXCLUDED.granted,
                   platform   = EXCLUDED.platform,
                   updated_at = GREATEST(EXCLUDED.updated_at, c.updated_at + INTERVAL '1 microsecond')
            RETURNING to_jsonb(c)
            "#,
        )
        .bind(Json(&row))
        .fetch_optional(&self.pool)
        .await?;
        stored.map(into_row).transpose()
    }
}
