use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::compatibility_report::CompatibilityReportView;
use deployment::Deployment;
use serde::Deserialize;
use services::services::compatibility::{
    CompatibilityError, CompatibilityRequest, CompatibilityResponse,
};
use tracing::debug;
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, auth::AuthUser, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub dog_id: Option<Uuid>,
}

/// POST /api/breeding/compatibility
/// Score a sire/dam pairing and save the result
pub async fn check_compatibility(
    State(deployment): State<DeploymentImpl>,
    AuthUser(caller): AuthUser,
    payload: Result<Json<CompatibilityRequest>, JsonRejection>,
) -> Result<ResponseJson<CompatibilityResponse>, ApiError> {
    // An unreadable body has no usable ids, which is reported as such.
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Unreadable compatibility request body");
            CompatibilityRequest::default()
        }
    };

    let response = deployment.compatibility().evaluate(caller, &request).await?;
    Ok(ResponseJson(response))
}

/// GET /api/breeding/compatibility/reports?dogId=
pub async fn list_reports(
    State(deployment): State<DeploymentImpl>,
    AuthUser(caller): AuthUser,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<ResponseJson<ApiResponse<Vec<CompatibilityReportView>>>, ApiError> {
    let Query(query) = query.map_err(|_| ApiError::BadRequest("Invalid dogId".to_string()))?;

    let reports = deployment
        .compatibility()
        .list_reports(caller, query.dog_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(reports)))
}

/// GET /api/breeding/compatibility/reports/{report_id}
pub async fn get_report(
    State(deployment): State<DeploymentImpl>,
    AuthUser(caller): AuthUser,
    report_id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<CompatibilityReportView>>, ApiError> {
    let Ok(Path(report_id)) = report_id else {
        return Err(CompatibilityError::ReportNotFound.into());
    };

    let report = deployment
        .compatibility()
        .get_report(caller, report_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/breeding/compatibility", post(check_compatibility))
        .route("/breeding/compatibility/reports", get(list_reports))
        .route(
            "/breeding/compatibility/reports/{report_id}",
            get(get_report),
        )
}
