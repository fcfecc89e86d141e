use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::coordinator::{RecordMeta, Resource};
use crate::entity::assignment;

pub struct CreateAssignment {
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub status: String,
    pub template_id: Option<i32>,
}

#[derive(Default)]
pub struct UpdateAssignment {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub difficulty: Option<String>,
    pub status: Option<String>,
    pub template_id: Option<Option<i32>>,
}

pub struct Assignment;

impl RecordMeta for assignment::Model {
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
impl Resource for Assignment {
    const KIND: &'static str = "assignment";
    const LABEL: &'static str = "Assignment";
    const BUCKET: &'static str = "assignments";

    type Record = assignment::Model;
    type CreateFields = CreateAssignment;
    type UpdateFields = UpdateAssignment;

    async fn insert<C: ConnectionTrait>(
        db: &C,
        fields: CreateAssignment,
        now: DateTime<Utc>,
    ) -> Result<assignment::Model, DbErr> {
        assignment::ActiveModel {
            title: Set(fields.title),
            description: Set(fields.description),
            difficulty: Set(fields.difficulty),
            status: Set(fields.status),
            template_id: Set(fields.template_id),
            blob_pointer: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<assignment::Model>, DbErr> {
        assignment::Entity::find_by_id(id).one(db).await
    }

    async fn set_pointer<C: ConnectionTrait>(
        db: &C,
        id: i32,
        pointer: &str,
        now: DateTime<Utc>,
    ) -> Result<assignment::Model, DbErr> {
        let model = assignment::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("assignment {id}")))?;
        let mut active: assignment::ActiveModel = model.into();
        active.blob_pointer = Set(Some(pointer.to_string()));
        active.updated_at = Set(now);
        active.update(db).await
    }

    async fn apply_update<C: ConnectionTrait>(
        db: &C,
        record: assignment::Model,
        fields: UpdateAssignment,
        pointer: &str,
        now: DateTime<Utc>,
    ) -> Result<assignment::Model, DbErr> {
        let mut active: assignment::ActiveModel = record.into();
        if let Some(title) = fields.title {
            active.title = Set(title);
        }
        if let Some(description) = fields.description {
            active.description = Set(description);
        }
        if let Some(difficulty) = fields.difficulty {
            active.difficulty = Set(difficulty);
        }
        if let Some(status) = fields.status {
            active.status = Set(status);
        }
        if let Some(template_id) = fields.template_id {
            active.template_id = Set(template_id);
        }
        active.blob_pointer = Set(Some(pointer.to_string()));
        active.updated_at = Set(now);
        active.update(db).await
    }

    async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<assignment::Model>, DbErr> {
        assignment::Entity::find()
            .order_by_desc(assignment::Column::UpdatedAt)
            .all(db)
            .await
    }

    async fn find_orphans<C: ConnectionTrait>(db: &C) -> Result<Vec<assignment::Model>, DbErr> {
        assignment::Entity::find()
            .filter(assignment::Column::BlobPointer.is_null())
            .order_by_desc(assignment::Column::UpdatedAt)
            .all(db)
            .await
    }
}
