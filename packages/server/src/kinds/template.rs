use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::coordinator::{RecordMeta, Resource};
use crate::entity::template;

pub struct CreateTemplate {
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
}

/// PATCH-style field set: `None` leaves a field untouched; the inner option
/// on `description` distinguishes "clear" from "leave alone".
#[derive(Default)]
pub struct UpdateTemplate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub difficulty: Option<String>,
}

pub struct Template;

impl RecordMeta for template::Model {
    fn id(&self) -> i32 {
        self.id
    }
    fn blob_pointer(&self) -> Option<&str> {
        self.blob_pointer.as_deref()
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[async_trait]
impl Resource for Template {
    const KIND: &'static str = "template";
    const LABEL: &'static str = "Template";
    const BUCKET: &'static str = "templates";

    type Record = template::Model;
    type CreateFields = CreateTemplate;
    type UpdateFields = UpdateTemplate;

    async fn insert<C: ConnectionTrait>(
        db: &C,
        fields: CreateTemplate,
        now: DateTime<Utc>,
    ) -> Result<template::Model, DbErr> {
        template::ActiveModel {
            title: Set(fields.title),
            description: Set(fields.description),
            difficulty: Set(fields.difficulty),
            blob_pointer: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<template::Model>, DbErr> {
        template::Entity::find_by_id(id).one(db).await
    }

    async fn set_pointer<C: ConnectionTrait>(
        db: &C,
        id: i32,
        pointer: &str,
        now: DateTime<Utc>,
    ) -> Result<template::Model, DbErr> {
        let model = template::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("template {id}")))?;
        let mut active: template::ActiveModel = model.into();
        active.blob_pointer = Set(Some(pointer.to_string()));
        active.updated_at = Set(now);
        active.update(db).await
    }

    async fn apply_update<C: ConnectionTrait>(
        db: &C,
        record: template::Model,
        fields: UpdateTemplate,
        pointer: &str,
        now: DateTime<Utc>,
    ) -> Result<template::Model, DbErr> {
        let mut active: template::ActiveModel = record.into();
        if let Some(title) = fields.title {
            active.title = Set(title);
        }
        if let Some(description) = fields.description {
            active.description = Set(description);
        }
        if let Some(difficulty) = fields.difficulty {
            active.difficulty = Set(difficulty);
        }
        active.blob_pointer = Set(Some(pointer.to_string()));
        active.updated_at = Set(now);
        active.update(db).await
    }

    async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<template::Model>, DbErr> {
        template::Entity::find()
            .order_by_desc(template::Column::UpdatedAt)
            .all(db)
            .await
    }

    async fn find_orphans<C: ConnectionTrait>(db: &C) -> Result<Vec<template::Model>, DbErr> {
        template::Entity::find()
            .filter(template::Column::BlobPointer.is_null())
            .order_by_desc(template::Column::UpdatedAt)
            .all(db)
            .await
    }
}
