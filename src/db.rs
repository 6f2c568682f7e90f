use anyhow::Context;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::{config::AppConfig, mapper::Row};

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store returned a non-object row: {0}")]
    MalformedRow(Value),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Postgres-backed store. The pool's credential is the privileged service
/// role, so row level security does not apply to these queries.
#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if config.run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("run migrations")?;
            tracing::info!("migrations applied");
        }

        tracing::info!("store client initialised");
        Ok(Self::new(pool))
    }
}

/// Rows are selected as `to_jsonb(...)` so they reach the mapper as objects.
pub(crate) fn into_row(value: Value) -> Result<Row, StoreError> {
    match value {
        Value::Object(row) => Ok(row),
        other => Err(StoreError::MalformedRow(other)),
    }
}
