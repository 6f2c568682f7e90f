use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{error, instrument};

use super::{
    dto::{ConsentWrite, UpsertConsentRequest, UserConsent},
    repo::{ConsentStore, CONSENT_FIELDS},
};
use crate::error::ServiceError;

#[derive(Clone)]
pub struct ConsentService {
    store: Arc<dyn ConsentStore>,
}

impl ConsentService {
    pub fn new(store: Arc<dyn ConsentStore>) -> Self {
        Self { store }
    }

    /// All consent records for a user, in no particular order.
    ///
    /// Store failures come back as an empty list, so callers cannot tell "no
    /// consents" from "lookup failed". Writes surface their failures. Whether
    /// reads should too is an open question for the service owner; keep the two
    /// paths as they are until that is settled.
    #[instrument(skip(self))]
    pub async fn get_consents(&self, user_id: &str) -> Vec<UserConsent> {
        let rows = match self.store.list_consents(user_id).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(%user_id, error = %e, "failed to fetch consents");
                return Vec::new();
            }
        };

        match rows
            .into_iter()
            .map(|row| CONSENT_FIELDS.from_row(row))
            .collect::<Result<Vec<UserConsent>, _>>()
        {
            Ok(consents) => consents,
            Err(e) => {
                error!(%user_id, error = %e, "failed to map consents");
                Vec::new()
            }
        }
    }

    /// Creates or overwrites the user's record for `request.consent_type`.
    #[instrument(skip(self, request), fields(consent_type = %request.consent_type))]
    pub async fn upsert_consent(
        &self,
        user_id: &str,
        request: UpsertConsentRequest,
    ) -> Result<UserConsent, ServiceError> {
        let failed = |detail: String| {
            error!(%user_id, %detail, "failed to upsert consent");
            ServiceError::ConsentNotSaved {
                user_id: user_id.to_string(),
                detail,
            }
        };

        let write = ConsentWrite {
            user_id,
            consent_type: &request.consent_type,
            granted: request.granted,
            platform: request.platform,
            updated_at: OffsetDateTime::now_utc(),
        };
        let row = CONSENT_FIELDS
            .to_row(&write)
            .map_err(|e| failed(e.to_string()))?;

        match self.store.upsert_consent(row).await {
            Ok(Some(stored)) => CONSENT_FIELDS
                .from_row(stored)
                .map_err(|e| failed(e.to_string())),
            Ok(None) => Err(failed("store returned no row".to_string())),
            Err(e) => Err(failed(e.to_string())),
        }
    }
}
