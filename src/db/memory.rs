//! In-process store used by tests and local runs without Postgres.
//!
//! Behaves like the Postgres tables: `user_consents` is unique on
//! `(user_id, consent_type)`, upserts happen under one lock, and
//! `updated_at` never moves backwards.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::StoreError;
use crate::{auth::repo::ProfileStore, consents::repo::ConsentStore, mapper::Row};

#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<String, Row>>,
    consents: RwLock<Vec<Row>>,
    failure: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_profile(&self, row: Row) {
        let id = row
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.profiles.write().await.insert(id, row);
    }

    /// Every following call fails with `message` until [`MemoryStore::recover`].
    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    pub async fn consent_count(&self) -> usize {
        self.consents.read().await.len()
    }

    async fn check(&self) -> Result<(), StoreError> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(StoreError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

fn text<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column).and_then(Value::as_str)
}

fn timestamp(row: &Row, column: &str) -> Result<OffsetDateTime, StoreError> {
    let raw = text(row, column)
        .ok_or_else(|| StoreError::Unavailable(format!("missing {column}")))?;
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|e| StoreError::Unavailable(format!("invalid {column}: {e}")))
}

fn format_timestamp(at: OffsetDateTime) -> Result<Value, StoreError> {
    at.format(&Rfc3339)
        .map(Value::String)
        .map_err(|e| StoreError::Unavailable(e.to_string()))
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile(&self, user_id: &str) -> Result<Option<Row>, StoreError> {
        self.check().await?;
        Ok(self.profiles.read().await.get(user_id).cloned())
    }
}

#[async_trait]
impl ConsentStore for MemoryStore {
    async fn list_consents(&self, user_id: &str) -> Result<Vec<Row>, StoreError> {
        self.check().await?;
        Ok(self
            .consents
            .read()
            .await
            .iter()
            .filter(|row| text(row, "user_id") == Some(user_id))
            .cloned()
            .collect())
    }

    async fn upsert_consent(&self, row: Row) -> Result<Option<Row>, StoreError> {
        self.check().await?;
        let user_id = text(&row, "user_id").map(str::to_owned);
        let consent_type = text(&row, "consent_type").map(str::to_owned);
        let written_at = timestamp(&row, "updated_at")?;

        let mut consents = self.consents.write().await;
        let existing = consents.iter_mut().find(|c| {
            text(c, "user_id") == user_id.as_deref()
                && text(c, "consent_type") == consent_type.as_deref()
        });

        if let Some(current) = existing {
            let previous = timestamp(current, "updated_at")?;
            let updated_at = if written_at > previous {
                written_at
            } else {
                previous + Duration::microseconds(1)
            };
            for column in ["granted", "platform"] {
                if let Some(value) = row.get(column) {
                    current.insert(column.to_string(), value.clone());
                }
            }
            current.insert("updated_at".into(), format_timestamp(updated_at)?);
            return Ok(Some(current.clone()));
        }

        let mut inserted = row;
        inserted.insert("id".into(), json!(Uuid::new_v4().to_string()));
        let stamp = format_timestamp(written_at)?;
        inserted.insert("created_at".into(), stamp.clone());
        inserted.insert("updated_at".into(), stamp);
        consents.push(inserted.clone());
        Ok(Some(inserted))
    }
}
