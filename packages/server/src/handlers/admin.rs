use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::coordinator::{self, RecordMeta, Resource};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::kinds::assignment::Assignment;
use crate::kinds::attempt::Attempt;
use crate::kinds::template::Template;
use crate::models::admin::{ConsistencyReport, KindReport, OrphanRecord, RepairResponse};
use crate::state::AppState;

async fn kind_report<K: Resource>(state: &AppState) -> Result<KindReport, AppError> {
    let orphan_records = coordinator::orphan_records::<K, _>(&state.db)
        .await?
        .iter()
        .map(OrphanRecord::from_record)
        .collect();
    let unreferenced_objects = coordinator::unreferenced_objects::<K, _>(&state.db, &state.blobs)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(KindReport {
        orphan_records,
        unreferenced_objects,
    })
}

#[utoipa::path(
    get,
    path = "/consistency",
    tag = "Admin",
    operation_id = "consistencyReport",
    summary = "Report cross-store inconsistencies",
    description = "For each resource kind, lists records stuck in partial creation (no bundle pointer) and stored bundle objects no record points at. Advisory only; nothing is modified.",
    responses(
        (status = 200, description = "Consistency report", body = ConsistencyReport),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Storage failure (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn consistency_report(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ConsistencyReport>, AppError> {
    Ok(Json(ConsistencyReport {
        templates: kind_report::<Template>(&state).await?,
        assignments: kind_report::<Assignment>(&state).await?,
        attempts: kind_report::<Attempt>(&state).await?,
    }))
}

async fn repair_kind<K: Resource>(state: &AppState, id: i32) -> Result<RepairResponse, AppError> {
    let (record, repaired) = coordinator::repair::<K, _>(&state.db, &state.blobs, id).await?;
    Ok(RepairResponse {
        kind: K::KIND.to_string(),
        id: record.id(),
        blob_pointer: record.blob_pointer().map(str::to_string),
        repaired,
    })
}

#[utoipa::path(
    post,
    path = "/repair/{kind}/{id}",
    tag = "Admin",
    operation_id = "repairRecord",
    summary = "Complete an interrupted creation",
    description = "If the record's derived bundle object exists in storage, patches the record's pointer. Returns 409 when no stored bundle exists; the resource must then be re-created.",
    params(
        ("kind" = String, Path, description = "Resource kind: template, assignment, or attempt"),
        ("id" = i32, Path, description = "Record ID"),
    ),
    responses(
        (status = 200, description = "Repair outcome", body = RepairResponse),
        (status = 400, description = "Unknown kind (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Record not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "No stored bundle to point at (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn repair_record(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i32)>,
) -> Result<Json<RepairResponse>, AppError> {
    let response = match kind.as_str() {
        "template" => repair_kind::<Template>(&state, id).await?,
        "assignment" => repair_kind::<Assignment>(&state, id).await?,
        "attempt" => repair_kind::<Attempt>(&state, id).await?,
        other => {
            return Err(AppError::Validation(format!(
                "Unknown kind '{other}'; expected template, assignment, or attempt"
            )));
        }
    };

    Ok(Json(response))
}
