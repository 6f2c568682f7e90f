use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::validation::{Constraint, FieldRule, Schema, Validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

const PLATFORMS: &[&str] = &["ios", "android"];

/// One user's decision for one consent category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConsent {
    pub id: String,
    pub user_id: String,
    pub consent_type: String,
    pub granted: bool,
    pub platform: Platform,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Body of `POST /consents`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertConsentRequest {
    pub consent_type: String,
    pub granted: bool,
    pub platform: Platform,
}

impl Validate for UpsertConsentRequest {
    const SCHEMA: Schema = Schema {
        fields: &[
            FieldRule {
                name: "consentType",
                constraint: Constraint::String { min_len: 1 },
            },
            FieldRule {
                name: "granted",
                constraint: Constraint::Boolean,
            },
            FieldRule {
                name: "platform",
                constraint: Constraint::OneOf(PLATFORMS),
            },
        ],
    };
}

/// Columns written by an upsert. `id` and `createdAt` are assigned by the store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConsentWrite<'a> {
    pub user_id: &'a str,
    pub consent_type: &'a str,
    pub granted: bool,
    pub platform: Platform,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
