use chrono::{DateTime, Utc};
use common::bundle::FilesMap;
use serde::{Deserialize, Serialize};

use crate::coordinator::Combined;
use crate::entity::assignment;
use crate::error::AppError;

use super::shared::{
    double_option, validate_assignment_status, validate_description, validate_difficulty,
    validate_title,
};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub description: Option<String>,
    /// One of: Beginner, Intermediate, Advanced.
    pub difficulty: String,
    /// One of: Not Started, In Progress, Completed.
    pub status: String,
    /// Template this assignment was cloned from, if any.
    pub template_id: Option<i32>,
    pub files: FilesMap,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct EditAssignmentRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub difficulty: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub template_id: Option<Option<i32>>,
    /// Full replacement bundle; prior files not present here are gone.
    pub files: FilesMap,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssignmentResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub status: String,
    pub template_id: Option<i32>,
    pub blob_pointer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssignmentDetailResponse {
    #[serde(flatten)]
    pub assignment: AssignmentResponse,
    pub files: Option<FilesMap>,
    pub payload_missing: bool,
    pub download_url: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssignmentListResponse {
    pub assignments: Vec<AssignmentResponse>,
    pub count: usize,
}

impl From<assignment::Model> for AssignmentResponse {
    fn from(m: assignment::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            difficulty: m.difficulty,
            status: m.status,
            template_id: m.template_id,
            blob_pointer: m.blob_pointer,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<Combined<assignment::Model>> for AssignmentDetailResponse {
    fn from(c: Combined<assignment::Model>) -> Self {
        let payload_missing = c.files.is_none();
        Self {
            assignment: c.record.into(),
            files: c.files,
            payload_missing,
            download_url: c.download_url,
        }
    }
}

pub fn validate_create_assignment(req: &CreateAssignmentRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_description(req.description.as_deref())?;
    validate_difficulty(&req.difficulty)?;
    validate_assignment_status(&req.status)
}

pub fn validate_edit_assignment(req: &EditAssignmentRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description.as_deref())?;
    }
    if let Some(ref difficulty) = req.difficulty {
        validate_difficulty(difficulty)?;
    }
    if let Some(ref status) = req.status {
        validate_assignment_status(status)?;
    }
    Ok(())
}
