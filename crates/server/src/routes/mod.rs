use axum::Router;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{DeploymentImpl, error::panic_response};

pub mod breeding_compatibility;
pub mod health;

pub fn router(deployment: DeploymentImpl) -> Router {
    let api = Router::new()
        .merge(health::router(&deployment))
        .merge(breeding_compatibility::router(&deployment));

    Router::new()
        .nest("/api", api)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}
