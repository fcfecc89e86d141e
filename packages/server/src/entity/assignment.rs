use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: Option<String>,
    /// One of: Beginner, Intermediate, Advanced
    pub difficulty: String,
    /// One of: Not Started, In Progress, Completed
    pub status: String,

    /// NULL for assignments authored from scratch.
    pub template_id: Option<i32>,
    #[sea_orm(belongs_to, from = "template_id", to = "id")]
    pub template: HasOne<super::template::Entity>,

    /// Durable locator of the files bundle ("<bucket>/<object>").
    /// NULL means the bundle was never written (partial creation).
    pub blob_pointer: Option<String>,

    #[sea_orm(has_many)]
    pub attempts: HasMany<super::attempt::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
