use chrono::{DateTime, Utc};
use common::bundle::FilesMap;
use serde::{Deserialize, Serialize};

use crate::coordinator::Combined;
use crate::entity::template;
use crate::error::AppError;

use super::shared::{double_option, validate_description, validate_difficulty, validate_title};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTemplateRequest {
    pub title: String,
    pub description: Option<String>,
    /// One of: Beginner, Intermediate, Advanced.
    pub difficulty: String,
    /// Starter files, path → content.
    pub files: FilesMap,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct EditTemplateRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub difficulty: Option<String>,
    /// Full replacement bundle; prior files not present here are gone.
    pub files: FilesMap,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TemplateResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    /// Durable bundle locator; null while creation is incomplete.
    pub blob_pointer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Combined view: record plus decoded bundle.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TemplateDetailResponse {
    #[serde(flatten)]
    pub template: TemplateResponse,
    pub files: Option<FilesMap>,
    /// True when the record exists but its bundle was never written.
    pub payload_missing: bool,
    /// Fresh presigned retrieval URL; expires, do not store.
    pub download_url: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateResponse>,
    pub count: usize,
}

impl From<template::Model> for TemplateResponse {
    fn from(m: template::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            difficulty: m.difficulty,
            blob_pointer: m.blob_pointer,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<Combined<template::Model>> for TemplateDetailResponse {
    fn from(c: Combined<template::Model>) -> Self {
        let payload_missing = c.files.is_none();
        Self {
            template: c.record.into(),
            files: c.files,
            payload_missing,
            download_url: c.download_url,
        }
    }
}

pub fn validate_create_template(req: &CreateTemplateRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_description(req.description.as_deref())?;
    validate_difficulty(&req.difficulty)
}

pub fn validate_edit_template(req: &EditTemplateRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description.as_deref())?;
    }
    if let Some(ref difficulty) = req.difficulty {
        validate_difficulty(difficulty)?;
    }
    Ok(())
}
