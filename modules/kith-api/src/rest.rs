use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use kith_common::KithError;

use crate::AppState;

#[derive(Deserialize)]
pub struct MergeRequest {
    keep_id: Uuid,
    merge_id: Uuid,
    candidate_id: Option<Uuid>,
}

/// GET /api/workspaces/{workspace_id}/duplicates
pub async fn list_duplicates(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<Uuid>,
) -> impl IntoResponse {
    match kith_store::candidates::list_pending(&state.pool, workspace_id).await {
        Ok(candidates) => Json(candidates).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/workspaces/{workspace_id}/duplicates/scan
pub async fn scan(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<Uuid>,
) -> impl IntoResponse {
    match kith_dedup::scan_workspace(&state.pool, workspace_id, &state.dedup).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/workspaces/{workspace_id}/duplicates/{candidate_id}/dismiss
pub async fn dismiss(
    State(state): State<Arc<AppState>>,
    Path((workspace_id, candidate_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    match kith_store::candidates::dismiss(&state.pool, candidate_id, workspace_id).await {
        Ok(()) => Json(serde_json::json!({"status": "dismissed"})).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/workspaces/{workspace_id}/duplicates/merge
pub async fn merge(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<MergeRequest>,
) -> impl IntoResponse {
    match kith_store::merge::merge_people(
        &state.pool,
        workspace_id,
        body.keep_id,
        body.merge_id,
        body.candidate_id,
    )
    .await
    {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: KithError) -> Response {
    let status = match &err {
        KithError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        KithError::NotFound(_) => StatusCode::NOT_FOUND,
        KithError::Conflict(_) => StatusCode::CONFLICT,
        KithError::Database(_) | KithError::Config(_) | KithError::Anyhow(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        warn!(error = %err, "Request failed");
    }

    (status, Json(serde_json::json!({"error": err.to_string()}))).into_response()
}
