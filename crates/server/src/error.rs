use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use services::services::compatibility::CompatibilityError;
use thiserror::Error;
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Compatibility(#[from] CompatibilityError),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Compatibility(err) => match err {
                CompatibilityError::MissingParents => (StatusCode::BAD_REQUEST, err.to_string()),
                CompatibilityError::SireNotFound
                | CompatibilityError::DamNotFound
                | CompatibilityError::ReportNotFound => (StatusCode::NOT_FOUND, err.to_string()),
                CompatibilityError::NotOwner => (StatusCode::FORBIDDEN, err.to_string()),
                CompatibilityError::Database(e) => {
                    error!(error = %e, "Database error while handling request");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        INTERNAL_ERROR_MESSAGE.to_string(),
                    )
                }
            },
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Response for a handler that panicked
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn maps_domain_errors_to_status_codes() {
        let cases = [
            (
                ApiError::from(CompatibilityError::MissingParents),
                StatusCode::BAD_REQUEST,
                "Both sireId and damId are required",
            ),
            (
                CompatibilityError::SireNotFound.into(),
                StatusCode::NOT_FOUND,
                "Sire not found",
            ),
            (
                CompatibilityError::DamNotFound.into(),
                StatusCode::NOT_FOUND,
                "Dam not found",
            ),
            (
                CompatibilityError::NotOwner.into(),
                StatusCode::FORBIDDEN,
                "You must own at least one of the dogs",
            ),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED, "Unauthorized"),
        ];

        for (err, status, message) in cases {
            assert_eq!(render(err).await, (status, json!({ "error": message })));
        }
    }

    #[tokio::test]
    async fn database_errors_are_not_leaked() {
        let err = ApiError::from(CompatibilityError::Database(sqlx::Error::PoolTimedOut));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }

    async fn boom() -> &'static str {
        panic!("kennel exploded")
    }

    #[tokio::test]
    async fn handler_panics_become_json_500() {
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(panic_response));

        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }
}
