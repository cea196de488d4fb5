use axum::{Router, extract::State, http::StatusCode, response::Json as ResponseJson, routing::get};
use deployment::Deployment;
use serde::Serialize;

use crate::DeploymentImpl;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    status: &'static str,
    version: &'static str,
    database: bool,
}

/// GET /api/health
pub async fn health_check(
    State(deployment): State<DeploymentImpl>,
) -> (StatusCode, ResponseJson<HealthStatus>) {
    let database = deployment.database_healthy().await;
    let (code, status) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        ResponseJson(HealthStatus {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/health", get(health_check))
}
