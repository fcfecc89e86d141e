use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "template")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: Option<String>,
    /// One of: Beginner, Intermediate, Advanced
    pub difficulty: String,

    /// Durable locator of the files bundle ("<bucket>/<object>").
    /// NULL means the bundle was never written (partial creation).
    pub blob_pointer: Option<String>,

    #[sea_orm(has_many)]
    pub assignments: HasMany<super::assignment::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
