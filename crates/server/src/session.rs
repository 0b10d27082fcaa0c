//! Login sessions.
//!
//! A session is an opaque random token stored in a cookie and mapped to a
//! user in the database. Sessions do not expire on their own; they are
//! removed on logout.

use chrono::Utc;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

pub(crate) const SESSION_COOKIE: &str = "ursaring_session";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,
    pub user_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
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

pub(crate) async fn create(db: &DatabaseConnection, user_id: i32) -> Result<Model, DbErr> {
    ActiveModel {
        token: ActiveValue::Set(Uuid::new_v4().simple().to_string()),
        user_id: ActiveValue::Set(user_id),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await
}

/// Resolve a session token to its session and active user.
pub(crate) async fn authenticate(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<(Model, super::user::Model)>, DbErr> {
    let found = Entity::find_by_id(token.to_string())
        .find_also_related(super::user::Entity)
        .one(db)
        .await?;

    Ok(match found {
        Some((session, Some(user))) if user.is_active => Some((session, user)),
        _ => None,
    })
}

pub(crate) async fn delete(db: &DatabaseConnection, token: &str) -> Result<(), DbErr> {
    Entity::delete_by_id(token.to_string()).exec(db).await?;
    Ok(())
}
