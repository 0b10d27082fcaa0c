//! Tokens granted by the budgeting service to a user.

use api_types::ynab::Token;
use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

pub(crate) const OAUTH_NAME: &str = "ynab";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "oauth_accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub oauth_name: String,
    pub access_token: String,
    pub expires_at: Option<DateTimeUtc>,
    pub refresh_token: Option<String>,
    pub account_id: String,
    pub account_email: String,
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

impl Model {
    /// `true` if the access token is known to be expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Absolute expiry of `token`. A lifetime out of range counts as unknown.
fn expires_at(token: &Token, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lifetime = TimeDelta::try_seconds(token.expires_in?)?;
    now.checked_add_signed(lifetime)
}

/// Return the budgeting-service account of a user, if any.
pub(crate) async fn for_user(db: &DatabaseConnection, user_id: i32) -> Result<Option<Model>, DbErr> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::OauthName.eq(OAUTH_NAME))
        .one(db)
        .await
}

/// Store a freshly granted token, replacing the previous one.
pub(crate) async fn upsert(
    db: &DatabaseConnection,
    user: &super::user::Model,
    token: &Token,
    now: DateTime<Utc>,
) -> Result<Model, DbErr> {
    match for_user(db, user.id).await? {
        Some(existing) => update_token(db, existing, token, now).await,
        None => {
            ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user.id),
                oauth_name: ActiveValue::Set(OAUTH_NAME.to_string()),
                access_token: ActiveValue::Set(token.access_token.clone()),
                expires_at: ActiveValue::Set(expires_at(token, now)),
                refresh_token: ActiveValue::Set(token.refresh_token.clone()),
                account_id: ActiveValue::Set(user.ynab_user_id.clone()),
                account_email: ActiveValue::Set(user.email.clone()),
            }
            .insert(db)
            .await
        }
    }
}

/// Replace the tokens of `account`. A token response without a refresh token
/// keeps the stored one.
pub(crate) async fn update_token(
    db: &DatabaseConnection,
    account: Model,
    token: &Token,
    now: DateTime<Utc>,
) -> Result<Model, DbErr> {
    let refresh_token = token
        .refresh_token
        .clone()
        .or_else(|| account.refresh_token.clone());

    let mut account: ActiveModel = account.into();
    account.access_token = ActiveValue::Set(token.access_token.clone());
    account.expires_at = ActiveValue::Set(expires_at(token, now));
    account.refresh_token = ActiveValue::Set(refresh_token);
    account.update(db).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(expires_at: Option<DateTime<Utc>>) -> Model {
        Model {
            id: 1,
            user_id: 1,
            oauth_name: OAUTH_NAME.to_string(),
            access_token: "a".to_string(),
            expires_at,
            refresh_token: None,
            account_id: "u".to_string(),
            account_email: "u@ynab.com".to_string(),
        }
    }

    fn token(expires_in: Option<i64>) -> Token {
        Token {
            access_token: "a".to_string(),
            token_type: Some("bearer".to_string()),
            expires_in,
            refresh_token: None,
            scope: None,
        }
    }

    #[test]
    fn token_without_expiry_never_expires() {
        assert!(!account(None).is_expired(Utc::now()));
    }

    #[test]
    fn token_expires_at_deadline() {
        let now = Utc::now();
        assert!(account(Some(now)).is_expired(now));
        assert!(account(Some(now - TimeDelta::seconds(1))).is_expired(now));
        assert!(!account(Some(now + TimeDelta::seconds(60))).is_expired(now));
    }

    #[test]
    fn expiry_is_computed_from_lifetime() {
        let now = Utc::now();
        assert_eq!(
            expires_at(&token(Some(7200)), now),
            Some(now + TimeDelta::seconds(7200))
        );
        assert_eq!(expires_at(&token(None), now), None);
    }

    #[test]
    fn out_of_range_lifetime_has_no_expiry() {
        let now = Utc::now();
        assert_eq!(expires_at(&token(Some(i64::MAX)), now), None);
        assert_eq!(expires_at(&token(Some(i64::MIN)), now), None);
        // In range for the delta, out of range for the date.
        assert_eq!(expires_at(&token(Some(i64::MAX / 1000)), now), None);
    }
}
