use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{
    auth::SessionVerifier,
    claude_api::ClaudeApiClient,
    compatibility::BreedingCompatibilityService,
    narrative::{ClaudeNarrativeEnhancer, DisabledNarrative, NarrativeEnhancer},
    record_store::SqliteRecordStore,
};
use tracing::info;

mod config;

pub use config::DeploymentConfig;

/// Single-process deployment backed by a local SQLite file.
#[derive(Clone)]
pub struct LocalDeployment {
    inner: Arc<Inner>,
}

struct Inner {
    db: DBService,
    sessions: SessionVerifier,
    compatibility: BreedingCompatibilityService,
}

impl LocalDeployment {
    pub async fn new(config: &DeploymentConfig) -> Result<Self, DeploymentError> {
        let db = DBService::new(&config.database_url).await?;
        let store = Arc::new(SqliteRecordStore::new(db.pool.clone()));
        let narrative = narrative_enhancer(config)?;

        Ok(Self {
            inner: Arc::new(Inner {
                sessions: SessionVerifier::new(&config.jwt_secret),
                compatibility: BreedingCompatibilityService::new(store, narrative),
                db,
            }),
        })
    }
}

fn narrative_enhancer(
    config: &DeploymentConfig,
) -> Result<Arc<dyn NarrativeEnhancer>, DeploymentError> {
    let Some(api_key) = config.anthropic_api_key.clone() else {
        info!("ANTHROPIC_API_KEY not set, using templated recommendations");
        return Ok(Arc::new(DisabledNarrative));
    };

    let client = ClaudeApiClient::new(
        api_key,
        config.narrative_model.clone(),
        config.narrative_timeout,
    )?;
    info!(
        model = %client.model(),
        timeout_secs = config.narrative_timeout.as_secs(),
        "Narrative recommendations enabled"
    );
    Ok(Arc::new(ClaudeNarrativeEnhancer::new(
        client,
        config.narrative_timeout,
    )))
}

#[async_trait]
impl Deployment for LocalDeployment {
    fn db(&self) -> &DBService {
        &self.inner.db
    }

    fn sessions(&self) -> &SessionVerifier {
        &self.inner.sessions
    }

    fn compatibility(&self) -> &BreedingCompatibilityService {
        &self.inner.compatibility
    }
}
