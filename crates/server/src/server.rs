use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{ServerError, auth, session, transactions, user};
use ynab::YnabClient;

pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// HTTP-level settings of the service.
#[derive(Clone, Debug)]
pub struct ServerSettings {
    /// Path every route is mounted under, e.g. `/api/v1`.
    pub api_prefix: String,
    /// Mark cookies `Secure`. Disable only for plain-HTTP development.
    pub secure_cookies: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            secure_cookies: true,
        }
    }
}

impl ServerSettings {
    /// The prefix with a leading slash and without a trailing one; empty
    /// when routes are mounted at the root.
    fn normalized_prefix(&self) -> String {
        let trimmed = self.api_prefix.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub ynab: Arc<YnabClient>,
    pub settings: Arc<ServerSettings>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, ynab: YnabClient, settings: ServerSettings) -> Self {
        Self {
            db,
            ynab: Arc::new(ynab),
            settings: Arc::new(settings),
        }
    }
}

/// Session authentication.
///
/// Requests must carry the session cookie set at login. The session and its
/// user are inserted in the request extensions.
async fn auth(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(token) = jar.get(session::SESSION_COOKIE).map(|c| c.value().to_string()) else {
        return Err(ServerError::Unauthorized);
    };

    let Some((session, user)) = session::authenticate(&state.db, &token).await? else {
        tracing::debug!("rejected unknown session");
        return Err(ServerError::Unauthorized);
    };

    request.extensions_mut().insert(session);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn api(state: ServerState) -> Router<ServerState> {
    let protected = Router::new()
        .route("/transactions", get(transactions::list))
        .route("/transactions/", get(transactions::list))
        .route("/users/me", get(user::me))
        .route("/auth/logout", post(auth::logout))
        .route_layer(middleware::from_fn_with_state(state, auth));

    Router::new()
        .route("/auth/ynab/authorize", get(auth::authorize))
        .route("/auth/ynab/callback", get(auth::callback))
        .merge(protected)
}

pub fn router(state: ServerState) -> Router {
    let prefix = state.settings.normalized_prefix();
    let api = api(state.clone());

    let router = if prefix.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(&prefix, api)
    };
    router.with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
