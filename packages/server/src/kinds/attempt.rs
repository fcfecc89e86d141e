use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::coordinator::{RecordMeta, Resource};
use crate::entity::attempt;

pub struct CreateAttempt {
    pub assignment_id: i32,
    /// From the authenticated session.
    pub user_id: i32,
    pub status: String,
    pub feedback: Option<String>,
}

/// Grading-side updates; `score` and `feedback` use clear-vs-leave semantics.
#[derive(Default)]
pub struct UpdateAttempt {
    pub status: Option<String>,
    pub score: Option<Option<i32>>,
    pub feedback: Option<Option<String>>,
}

pub struct Attempt;

impl RecordMeta for attempt::Model {
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
impl Resource for Attempt {
    const KIND: &'static str = "attempt";
    const LABEL: &'static str = "Attempt";
    const BUCKET: &'static str = "attempts";

    type Record = attempt::Model;
    type CreateFields = CreateAttempt;
    type UpdateFields = UpdateAttempt;

    async fn insert<C: ConnectionTrait>(
        db: &C,
        fields: CreateAttempt,
        now: DateTime<Utc>,
    ) -> Result<attempt::Model, DbErr> {
        attempt::ActiveModel {
            assignment_id: Set(fields.assignment_id),
            user_id: Set(fields.user_id),
            status: Set(fields.status),
            score: Set(None),
            feedback: Set(fields.feedback),
            blob_pointer: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<attempt::Model>, DbErr> {
        attempt::Entity::find_by_id(id).one(db).await
    }

    async fn set_pointer<C: ConnectionTrait>(
        db: &C,
        id: i32,
        pointer: &str,
        now: DateTime<Utc>,
    ) -> Result<attempt::Model, DbErr> {
        let model = attempt::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("attempt {id}")))?;
        let mut active: attempt::ActiveModel = model.into();
        active.blob_pointer = Set(Some(pointer.to_string()));
        active.updated_at = Set(now);
        active.update(db).await
    }

    async fn apply_update<C: ConnectionTrait>(
        db: &C,
        record: attempt::Model,
        fields: UpdateAttempt,
        pointer: &str,
        now: DateTime<Utc>,
    ) -> Result<attempt::Model, DbErr> {
        let mut active: attempt::ActiveModel = record.into();
        if let Some(status) = fields.status {
            active.status = Set(status);
        }
        if let Some(score) = fields.score {
            active.score = Set(score);
        }
        if let Some(feedback) = fields.feedback {
            active.feedback = Set(feedback);
        }
        active.blob_pointer = Set(Some(pointer.to_string()));
        active.updated_at = Set(now);
        active.update(db).await
    }

    async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<attempt::Model>, DbErr> {
        attempt::Entity::find()
            .order_by_desc(attempt::Column::UpdatedAt)
            .all(db)
            .await
    }

    async fn find_orphans<C: ConnectionTrait>(db: &C) -> Result<Vec<attempt::Model>, DbErr> {
        attempt::Entity::find()
            .filter(attempt::Column::BlobPointer.is_null())
            .order_by_desc(attempt::Column::UpdatedAt)
            .all(db)
            .await
    }
}
