use axum::Router;

pub mod auth;
pub mod error;
pub mod routes;

pub type DeploymentImpl = local_deployment::LocalDeployment;

/// Full HTTP application for a running deployment.
pub fn app(deployment: DeploymentImpl) -> Router {
    routes::router(deployment)
}
