use chrono::{DateTime, Utc};
use common::bundle::FilesMap;
use serde::{Deserialize, Serialize};

use crate::coordinator::Combined;
use crate::entity::attempt;
use crate::error::AppError;

use super::shared::{
    double_option, validate_attempt_status, validate_feedback, validate_score,
};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateAttemptRequest {
    pub assignment_id: i32,
    /// Submitted solution files, path → content.
    pub files: FilesMap,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct EditAttemptRequest {
    /// One of: Submitted, Under Review, Graded.
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub score: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub feedback: Option<Option<String>>,
    /// Full replacement bundle; prior files not present here are gone.
    pub files: FilesMap,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct AttemptListQuery {
    pub assignment_id: Option<i32>,
    pub user_id: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AttemptResponse {
    pub id: i32,
    pub assignment_id: i32,
    pub user_id: i32,
    pub status: String,
    pub score: Option<i32>,
    pub feedback: Option<String>,
    pub blob_pointer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AttemptDetailResponse {
    #[serde(flatten)]
    pub attempt: AttemptResponse,
    pub files: Option<FilesMap>,
    pub payload_missing: bool,
    pub download_url: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AttemptListResponse {
    pub attempts: Vec<AttemptResponse>,
    pub count: usize,
}

impl From<attempt::Model> for AttemptResponse {
    fn from(m: attempt::Model) -> Self {
        Self {
            id: m.id,
            assignment_id: m.assignment_id,
            user_id: m.user_id,
            status: m.status,
            score: m.score,
            feedback: m.feedback,
            blob_pointer: m.blob_pointer,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<Combined<attempt::Model>> for AttemptDetailResponse {
    fn from(c: Combined<attempt::Model>) -> Self {
        let payload_missing = c.files.is_none();
        Self {
            attempt: c.record.into(),
            files: c.files,
            payload_missing,
            download_url: c.download_url,
        }
    }
}

pub fn validate_edit_attempt(req: &EditAttemptRequest) -> Result<(), AppError> {
    if let Some(ref status) = req.status {
        validate_attempt_status(status)?;
    }
    if let Some(score) = req.score {
        validate_score(score)?;
    }
    if let Some(ref feedback) = req.feedback {
        validate_feedback(feedback.as_deref())?;
    }
    Ok(())
}
