use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::EntityTrait;
use tracing::instrument;

use crate::coordinator;
use crate::entity::template;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::kinds::assignment::{Assignment, CreateAssignment, UpdateAssignment};
use crate::models::assignment::*;
use crate::state::AppState;

async fn ensure_template_exists(state: &AppState, template_id: i32) -> Result<(), AppError> {
    if template::Entity::find_by_id(template_id)
        .one(&state.db)
        .await?
        .is_none()
    {
        return Err(AppError::Validation(format!(
            "template_id {template_id} does not reference an existing template"
        )));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/createAssignment",
    tag = "Assignments",
    operation_id = "createAssignment",
    summary = "Create an assignment with its working files",
    description = "Inserts the assignment record, stores its file bundle, then patches the record with the bundle pointer. A 500 with code PARTIAL_WRITE means the record exists without its bundle; pass the id to the repair endpoint.",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Storage failure (STORAGE_ERROR, PARTIAL_WRITE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(title = %payload.title))]
pub async fn create_assignment(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_assignment(&payload)?;
    if let Some(template_id) = payload.template_id {
        ensure_template_exists(&state, template_id).await?;
    }

    let fields = CreateAssignment {
        title: payload.title.trim().to_string(),
        description: payload.description,
        difficulty: payload.difficulty,
        status: payload.status,
        template_id: payload.template_id,
    };
    let record =
        coordinator::create::<Assignment, _>(&state.db, &state.blobs, fields, &payload.files)
            .await?;

    Ok((StatusCode::CREATED, Json(AssignmentResponse::from(record))))
}

#[utoipa::path(
    get,
    path = "/listAssignments",
    tag = "Assignments",
    operation_id = "listAssignments",
    summary = "List assignment metadata",
    description = "Returns assignment records only, most recently updated first. File bundles are never fetched for listings.",
    responses(
        (status = 200, description = "List of assignments", body = AssignmentListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_assignments(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AssignmentListResponse>, AppError> {
    let records = coordinator::list::<Assignment, _>(&state.db).await?;
    let assignments: Vec<AssignmentResponse> = records.into_iter().map(Into::into).collect();
    let count = assignments.len();

    Ok(Json(AssignmentListResponse { assignments, count }))
}

#[utoipa::path(
    get,
    path = "/getAssignment/{id}",
    tag = "Assignments",
    operation_id = "getAssignment",
    summary = "Get an assignment with its files",
    description = "Returns the combined view: record fields, the decoded file bundle, and a fresh presigned download URL. A record whose bundle was never written comes back with `payload_missing: true` and no files.",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment details", body = AssignmentDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Payload unreadable (CORRUPT_PAYLOAD, STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_assignment(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AssignmentDetailResponse>, AppError> {
    let combined = coordinator::read_one::<Assignment, _>(&state.db, &state.blobs, id).await?;
    Ok(Json(combined.into()))
}

#[utoipa::path(
    put,
    path = "/editAssignment/{id}",
    tag = "Assignments",
    operation_id = "editAssignment",
    summary = "Edit an assignment, replacing its files",
    description = "Writes the replacement bundle first, then patches the record. The `files` map is a full overwrite. Omitted metadata fields keep their values, explicit nulls clear them.",
    params(("id" = i32, Path, description = "Assignment ID")),
    request_body = EditAssignmentRequest,
    responses(
        (status = 200, description = "Assignment updated", body = AssignmentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage failure (STORAGE_ERROR, PARTIAL_WRITE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload))]
pub async fn edit_assignment(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<EditAssignmentRequest>,
) -> Result<Json<AssignmentResponse>, AppError> {
    validate_edit_assignment(&payload)?;
    if let Some(Some(template_id)) = payload.template_id {
        ensure_template_exists(&state, template_id).await?;
    }

    let fields = UpdateAssignment {
        title: payload.title.map(|t| t.trim().to_string()),
        description: payload.description,
        difficulty: payload.difficulty,
        status: payload.status,
        template_id: payload.template_id,
    };
    let record =
        coordinator::update::<Assignment, _>(&state.db, &state.blobs, id, fields, &payload.files)
            .await?;

    Ok(Json(AssignmentResponse::from(record)))
}
