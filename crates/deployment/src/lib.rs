use async_trait::async_trait;
use db::DBService;
use services::services::{
    auth::SessionVerifier, claude_api::ClaudeApiError, compatibility::BreedingCompatibilityService,
};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Claude(#[from] ClaudeApiError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Everything a request handler needs from the running service.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    fn db(&self) -> &DBService;

    fn sessions(&self) -> &SessionVerifier;

    fn compatibility(&self) -> &BreedingCompatibilityService;

    /// Whether the database answers a trivial query.
    async fn database_healthy(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.db().pool).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                false
            }
        }
    }
}
