//! User entity for SeaORM.
//!
//! Rows are created by the identity provider's sync job; this service only
//! reads them and flips `is_banned`.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use patchouli_core::domain::Role;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub is_banned: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
impl From<Model> for patchouli_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            avatar_url: model.avatar_url,
            // Unknown role strings demote to the ordinary tier.
            role: Role::from_str(&model.role).unwrap_or(Role::User),
            is_banned: model.is_banned,
            created_at: model.created_at.into(),
        }
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<patchouli_core::domain::User> for ActiveModel {
    fn from(user: patchouli_core::domain::User) -> Self {
        Self {
            id: Set(user.id),
            name: Set(user.name),
            avatar_url: Set(user.avatar_url),
            role: Set(user.role.as_str().to_string()),
            is_banned: Set(user.is_banned),
            created_at: Set(user.created_at.into()),
        }
    }
}
