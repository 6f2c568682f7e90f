use std::sync::Arc;

use tracing::{instrument, warn};

use super::{
    dto::Profile,
    repo::{ProfileStore, PROFILE_FIELDS},
};
use crate::error::ServiceError;

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Fetches one profile. A missing row and a failed lookup look the same to
    /// the caller; only the log tells them apart. No retries.
    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, ServiceError> {
        let not_found = || ServiceError::ProfileNotFound {
            user_id: user_id.to_string(),
        };

        if user_id.is_empty() {
            warn!("profile requested with empty user id");
            return Err(not_found());
        }

        let row = match self.store.find_profile(user_id).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                warn!(%user_id, "profile not found: no row");
                return Err(not_found());
            }
            Err(e) => {
                warn!(%user_id, error = %e, "profile not found: lookup failed");
                return Err(not_found());
            }
        };

        PROFILE_FIELDS.from_row(row).map_err(|e| {
            warn!(%user_id, error = %e, "profile not found: row did not map");
            not_found()
        })
    }
}
