use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use deployment::Deployment;
use tracing::debug;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

/// Account id of the caller, taken from a verified bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl FromRequestParts<DeploymentImpl> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        deployment: &DeploymentImpl,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        deployment
            .sessions()
            .verify_header(header)
            .map(AuthUser)
            .map_err(|e| {
                debug!(error = %e, path = %parts.uri.path(), "Rejected unauthenticated request");
                ApiError::Unauthorized
            })
    }
}
