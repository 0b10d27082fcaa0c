//! OAuth2 login against the budgeting service and logout.

use axum::{
    Extension,
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, oauth_account, server::ServerState, session, user};

const STATE_COOKIE: &str = "ursaring_oauth_state";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

fn cookie(name: &'static str, value: String, same_site: SameSite, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(same_site)
        .secure(secure)
        .build()
}

fn removal(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

/// Start the login: remember a random `state` and send the user agent to the
/// budgeting service.
pub async fn authorize(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ServerError> {
    let csrf = Uuid::new_v4().simple().to_string();
    let url = state.ynab.authorize_url(&csrf)?;

    // Lax: the callback is a cross-site top-level navigation.
    let jar = jar.add(cookie(
        STATE_COOKIE,
        csrf,
        SameSite::Lax,
        state.settings.secure_cookies,
    ));
    Ok((jar, Redirect::to(url.as_str())))
}

/// Finish the login: exchange the code, create the user on first login and
/// open a session.
pub async fn callback(
    State(state): State<ServerState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect), ServerError> {
    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    if expected.is_none() || expected != params.state {
        return Err(ServerError::BadRequest("invalid OAuth state".to_string()));
    }
    if let Some(error) = params.error {
        let detail = params.error_description.unwrap_or(error);
        return Err(ServerError::BadRequest(format!("authorization denied: {detail}")));
    }
    let Some(code) = params.code else {
        return Err(ServerError::BadRequest("missing authorization code".to_string()));
    };

    let token = state.ynab.exchange_code(&code).await?;
    let upstream_user = state.ynab.user(&token.access_token).await?;

    let user = user::find_or_create(&state.db, &upstream_user.id).await?;
    oauth_account::upsert(&state.db, &user, &token, Utc::now()).await?;
    let session = session::create(&state.db, user.id).await?;
    tracing::info!("user {} logged in", user.id);

    let jar = jar.remove(removal(STATE_COOKIE)).add(cookie(
        session::SESSION_COOKIE,
        session.token,
        SameSite::Strict,
        state.settings.secure_cookies,
    ));
    Ok((jar, Redirect::to("/")))
}

pub async fn logout(
    Extension(session): Extension<session::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ServerError> {
    session::delete(&state.db, &session.token).await?;
    tracing::info!("user {} logged out", session.user_id);

    Ok((jar.remove(removal(session::SESSION_COOKIE)), StatusCode::NO_CONTENT))
}
