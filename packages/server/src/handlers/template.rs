use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::coordinator;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::kinds::template::{CreateTemplate, Template, UpdateTemplate};
use crate::models::template::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/createTemplate",
    tag = "Templates",
    operation_id = "createTemplate",
    summary = "Create a template with its starter files",
    description = "Inserts the template record, stores its file bundle, then patches the record with the bundle pointer. A 500 with code PARTIAL_WRITE means the record exists but the bundle or pointer patch failed; the record id in the message can be passed to the repair endpoint.",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = TemplateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Storage failure (STORAGE_ERROR, PARTIAL_WRITE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(title = %payload.title))]
pub async fn create_template(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_template(&payload)?;

    let fields = CreateTemplate {
        title: payload.title.trim().to_string(),
        description: payload.description,
        difficulty: payload.difficulty,
    };
    let record =
        coordinator::create::<Template, _>(&state.db, &state.blobs, fields, &payload.files).await?;

    Ok((StatusCode::CREATED, Json(TemplateResponse::from(record))))
}

#[utoipa::path(
    get,
    path = "/listTemplates",
    tag = "Templates",
    operation_id = "listTemplates",
    summary = "List template metadata",
    description = "Returns template records only, most recently updated first. File bundles are never fetched for listings.",
    responses(
        (status = 200, description = "List of templates", body = TemplateListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_templates(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<TemplateListResponse>, AppError> {
    let records = coordinator::list::<Template, _>(&state.db).await?;
    let templates: Vec<TemplateResponse> = records.into_iter().map(Into::into).collect();
    let count = templates.len();

    Ok(Json(TemplateListResponse { templates, count }))
}

#[utoipa::path(
    get,
    path = "/getTemplate/{id}",
    tag = "Templates",
    operation_id = "getTemplate",
    summary = "Get a template with its files",
    description = "Returns the combined view: record fields, the decoded file bundle, and a fresh presigned download URL. A record whose bundle was never written comes back with `payload_missing: true` and no files.",
    params(("id" = i32, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template details", body = TemplateDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Payload unreadable (CORRUPT_PAYLOAD, STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_template(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TemplateDetailResponse>, AppError> {
    let combined = coordinator::read_one::<Template, _>(&state.db, &state.blobs, id).await?;
    Ok(Json(combined.into()))
}

#[utoipa::path(
    put,
    path = "/editTemplate/{id}",
    tag = "Templates",
    operation_id = "editTemplate",
    summary = "Edit a template, replacing its files",
    description = "Writes the replacement bundle first, then patches the record. The `files` map is a full overwrite; files absent from it are gone. Omitted metadata fields keep their values, explicit nulls clear them.",
    params(("id" = i32, Path, description = "Template ID")),
    request_body = EditTemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = TemplateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage failure (STORAGE_ERROR, PARTIAL_WRITE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload))]
pub async fn edit_template(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<EditTemplateRequest>,
) -> Result<Json<TemplateResponse>, AppError> {
    validate_edit_template(&payload)?;

    let fields = UpdateTemplate {
        title: payload.title.map(|t| t.trim().to_string()),
        description: payload.description,
        difficulty: payload.difficulty,
    };
    let record =
        coordinator::update::<Template, _>(&state.db, &state.blobs, id, fields, &payload.files)
            .await?;

    Ok(Json(TemplateResponse::from(record)))
}
