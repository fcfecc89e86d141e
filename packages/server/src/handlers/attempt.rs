use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::instrument;

use crate::coordinator;
use crate::entity::{assignment, attempt};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::kinds::attempt::{Attempt, CreateAttempt, UpdateAttempt};
use crate::models::attempt::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/createAttempt",
    tag = "Attempts",
    operation_id = "createAttempt",
    summary = "Submit an attempt against an assignment",
    description = "Records a submission for the authenticated user. The attempt starts in status Submitted with no score; graders fill in score and feedback through the edit endpoint. A 500 with code PARTIAL_WRITE means the record exists without its bundle.",
    request_body = CreateAttemptRequest,
    responses(
        (status = 201, description = "Attempt recorded", body = AttemptResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Storage failure (STORAGE_ERROR, PARTIAL_WRITE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(assignment_id = payload.assignment_id))]
pub async fn create_attempt(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if assignment::Entity::find_by_id(payload.assignment_id)
        .one(&state.db)
        .await?
        .is_none()
    {
        return Err(AppError::Validation(format!(
            "assignment_id {} does not reference an existing assignment",
            payload.assignment_id
        )));
    }

    let fields = CreateAttempt {
        assignment_id: payload.assignment_id,
        user_id: auth_user.user_id,
        status: "Submitted".to_string(),
        feedback: None,
    };
    let record =
        coordinator::create::<Attempt, _>(&state.db, &state.blobs, fields, &payload.files).await?;

    Ok((StatusCode::CREATED, Json(AttemptResponse::from(record))))
}

#[utoipa::path(
    get,
    path = "/listAttempts",
    tag = "Attempts",
    operation_id = "listAttempts",
    summary = "List attempt metadata",
    description = "Returns attempt records only, most recently updated first, optionally filtered by assignment and user. File bundles are never fetched for listings.",
    params(AttemptListQuery),
    responses(
        (status = 200, description = "List of attempts", body = AttemptListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_attempts(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AttemptListQuery>,
) -> Result<Json<AttemptListResponse>, AppError> {
    let mut select = attempt::Entity::find();
    if let Some(assignment_id) = query.assignment_id {
        select = select.filter(attempt::Column::AssignmentId.eq(assignment_id));
    }
    if let Some(user_id) = query.user_id {
        select = select.filter(attempt::Column::UserId.eq(user_id));
    }

    let records = select
        .order_by_desc(attempt::Column::UpdatedAt)
        .all(&state.db)
        .await?;
    let attempts: Vec<AttemptResponse> = records.into_iter().map(Into::into).collect();
    let count = attempts.len();

    Ok(Json(AttemptListResponse { attempts, count }))
}

#[utoipa::path(
    get,
    path = "/getAttempt/{id}",
    tag = "Attempts",
    operation_id = "getAttempt",
    summary = "Get an attempt with its submitted files",
    description = "Returns the combined view: record fields, the decoded file bundle, and a fresh presigned download URL. A record whose bundle was never written comes back with `payload_missing: true` and no files.",
    params(("id" = i32, Path, description = "Attempt ID")),
    responses(
        (status = 200, description = "Attempt details", body = AttemptDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Payload unreadable (CORRUPT_PAYLOAD, STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_attempt(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AttemptDetailResponse>, AppError> {
    let combined = coordinator::read_one::<Attempt, _>(&state.db, &state.blobs, id).await?;
    Ok(Json(combined.into()))
}

#[utoipa::path(
    put,
    path = "/editAttempt/{id}",
    tag = "Attempts",
    operation_id = "editAttempt",
    summary = "Edit an attempt, replacing its files",
    description = "Used both for re-submission (new files) and grading (status, score, feedback). Writes the replacement bundle first, then patches the record. Omitted fields keep their values, explicit nulls clear them.",
    params(("id" = i32, Path, description = "Attempt ID")),
    request_body = EditAttemptRequest,
    responses(
        (status = 200, description = "Attempt updated", body = AttemptResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage failure (STORAGE_ERROR, PARTIAL_WRITE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload))]
pub async fn edit_attempt(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<EditAttemptRequest>,
) -> Result<Json<AttemptResponse>, AppError> {
    validate_edit_attempt(&payload)?;

    let fields = UpdateAttempt {
        status: payload.status,
        score: payload.score,
        feedback: payload.feedback,
    };
    let record =
        coordinator::update::<Attempt, _>(&state.db, &state.blobs, id, fields, &payload.files)
            .await?;

    Ok(Json(AttemptResponse::from(record)))
}
