use async_trait::async_trait;
use serde_json::Value;

use crate::{
    db::{into_row, PgStore, StoreError},
    mapper::{field, FieldTable, Row},
};

pub static PROFILE_FIELDS: FieldTable = FieldTable {
    entity: "profile",
    table: "profiles",
    fields: &[
        field("id", "id"),
        field("email", "email"),
        field("first_name", "firstName"),
        field("last_name", "lastName"),
        field("locale", "locale"),
        field("created_at", "createdAt"),
    ],
};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Point lookup by primary key.
    async fn find_profile(&self, user_id: &str) -> Result<Option<Row>, StoreError>;
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn find_profile(&self, user_id: &str) -> Result<Option<Row>, StoreError> {
        let sql = format!(
            "SELECT to_jsonb(r) FROM (SELECT {} FROM {} WHERE id = $1::uuid) r",
            PROFILE_FIELDS.columns(),
            PROFILE_FIELDS.table,
        );
        let row = sqlx::query_scalar::<_, Value>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(into_row).transpose()
    }
}
