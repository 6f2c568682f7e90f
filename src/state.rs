use crate::auth::{repo::ProfileStore, services::ProfileService, TokenVerifier};
use crate::config::AppConfig;
use crate::consents::{repo::ConsentStore, services::ConsentService};
use crate::db::PgStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub verifier: Arc<TokenVerifier>,
    pub profiles: ProfileService,
    pub consents: ConsentService,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        // One Postgres pool behind both stores.
        let store = Arc::new(PgStore::connect(&config).await?);
        let verifier = Arc::new(TokenVerifier::from_config(&config.auth)?);

        Ok(Self::from_parts(
            config,
            verifier,
            store.clone() as Arc<dyn ProfileStore>,
            store as Arc<dyn ConsentStore>,
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        verifier: Arc<TokenVerifier>,
        profiles: Arc<dyn ProfileStore>,
        consents: Arc<dyn ConsentStore>,
    ) -> Self {
        Self {
            config,
            verifier,
            profiles: ProfileService::new(profiles),
            consents: ConsentService::new(consents),
        }
    }
}
