//! CRUD handlers for stored reports.
//!
//! Bodies are parsed into the typed record of their kind and validated before they are stored.
//! The stored body is the record's own serialization, so unknown fields are dropped and
//! defaults filled in.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use inspections::{Report, ReportKind};
use serde_json::Value;
use tracing::info;

use super::{parse_id, parse_kind};
use crate::error::{ApiError, ApiResult};
use crate::store::{ReportSummary, StoreError, StoredReport};
use crate::AppState;

fn checked_body(kind: ReportKind, body: Value) -> ApiResult<Value> {
    let report = Report::from_json(kind, body)?;
    report.validate()?;
    Ok(report.to_json().map_err(StoreError::from)?)
}

/// Handler: GET /api/reports/{kind}
pub async fn handle_list_reports(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Json<Vec<ReportSummary>>> {
    let kind = parse_kind(&kind)?;
    let reports = state.store.list(kind).await?;
    Ok(Json(reports.iter().map(StoredReport::summary).collect()))
}

/// Handler: POST /api/reports/{kind}
pub async fn handle_create_report(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<StoredReport>)> {
    let kind = parse_kind(&kind)?;
    let body = checked_body(kind, body)?;
    let stored = state.store.create(kind, &body).await?;
    info!("Created {} report {}", kind, stored.id);
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Handler: GET /api/reports/{kind}/{id}
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<StoredReport>> {
    let kind = parse_kind(&kind)?;
    let id = parse_id(&id)?;
    state
        .store
        .get(kind, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Handler: PUT /api/reports/{kind}/{id}
pub async fn handle_update_report(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<StoredReport>> {
    let kind = parse_kind(&kind)?;
    let id = parse_id(&id)?;
    let body = checked_body(kind, body)?;
    let updated = state
        .store
        .update(kind, id, &body)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!("Updated {} report {}", kind, id);
    Ok(Json(updated))
}

/// Handler: DELETE /api/reports/{kind}/{id}
pub async fn handle_delete_report(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    let id = parse_id(&id)?;
    if state.store.delete(kind, id).await? {
        info!("Deleted {} report {}", kind, id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
