//! The module contains the definition of a user and its endpoints.
//!
//! A user is created the first time somebody logs in through the budgeting
//! service; its email is derived from the upstream user id.

use api_types::user::UserView;
use axum::{Extension, Json};
use sea_orm::{ActiveValue, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub ynab_user_id: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::oauth_account::Entity")]
    OauthAccounts,
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::oauth_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OauthAccounts.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Email used for accounts created from the budgeting service.
pub(crate) fn email_for(ynab_user_id: &str) -> String {
    format!("{ynab_user_id}@ynab.com")
}

/// Return the user bound to `ynab_user_id`, creating it on first login.
pub(crate) async fn find_or_create(
    db: &DatabaseConnection,
    ynab_user_id: &str,
) -> Result<Model, DbErr> {
    if let Some(user) = Entity::find()
        .filter(Column::YnabUserId.eq(ynab_user_id))
        .one(db)
        .await?
    {
        return Ok(user);
    }

    tracing::info!("creating user for budgeting account {ynab_user_id}");
    ActiveModel {
        id: ActiveValue::NotSet,
        email: ActiveValue::Set(email_for(ynab_user_id)),
        ynab_user_id: ActiveValue::Set(ynab_user_id.to_string()),
        is_active: ActiveValue::Set(true),
    }
    .insert(db)
    .await
}

/// Return the authenticated user.
pub async fn me(Extension(user): Extension<Model>) -> Json<UserView> {
    Json(UserView {
        id: user.id,
        email: user.email,
    })
}
