//! Post entity for SeaORM.
//!
//! Tags and attachments live in JSON buckets; status is the lowercase
//! string form of `PostStatus` so conditional updates can filter on it.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use patchouli_core::domain::{Attachment, PostStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub tags: Json,
    pub attachments: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub search_clues: Option<String>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for patchouli_core::domain::Post {
    fn from(model: Model) -> Self {
        let tags: Vec<String> = serde_json::from_value(model.tags).unwrap_or_default();
        let attachments: Vec<Attachment> =
            serde_json::from_value(model.attachments).unwrap_or_default();
        Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            body: model.body,
            tags,
            attachments,
            search_clues: model.search_clues,
            status: PostStatus::from_str(&model.status).unwrap_or(PostStatus::Pending),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<patchouli_core::domain::Post> for ActiveModel {
    fn from(post: patchouli_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            title: Set(post.title),
            body: Set(post.body),
            tags: Set(serde_json::json!(post.tags)),
            attachments: Set(serde_json::json!(post.attachments)),
            search_clues: Set(post.search_clues),
            status: Set(post.status.as_str().to_string()),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
