use api_types::error::ErrorDetail;
use axum::{Json, http::StatusCode, response::IntoResponse};
use sea_orm::DbErr;
use serde::Serialize;
use ynab::YnabError;

pub use server::{ServerSettings, ServerState, router, run_with_listener, spawn_with_listener};

mod auth;
mod oauth_account;
mod server;
mod session;
mod transactions;
mod user;

pub enum ServerError {
    Upstream(YnabError),
    Database(DbErr),
    Unauthorized,
    BadRequest(String),
}

/// Error body, always `{"error": ...}`.
///
/// Upstream failures keep the structured detail of the budgeting service,
/// every other error is a plain message.
#[derive(Serialize)]
#[serde(untagged)]
enum ErrorBody {
    Upstream(ErrorDetail),
    Message(String),
}

#[derive(Serialize)]
struct Error {
    error: ErrorBody,
}

fn status_and_body(err: ServerError) -> (StatusCode, ErrorBody) {
    match err {
        ServerError::Upstream(YnabError::Upstream { status, error }) => (
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            ErrorBody::Upstream(error),
        ),
        ServerError::Upstream(YnabError::Network(err)) => {
            tracing::error!("budgeting service unreachable: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody::Message("budgeting service unavailable".to_string()),
            )
        }
        ServerError::Upstream(YnabError::Decode(err)) => {
            tracing::error!("unexpected answer from budgeting service: {err}");
            (
                StatusCode::BAD_GATEWAY,
                ErrorBody::Message("unexpected answer from budgeting service".to_string()),
            )
        }
        ServerError::Upstream(err) => {
            tracing::error!("budgeting service client misconfigured: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::Message("internal server error".to_string()),
            )
        }
        ServerError::Database(err) => {
            tracing::error!("database error: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::Message("internal server error".to_string()),
            )
        }
        ServerError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            ErrorBody::Message("unauthorized".to_string()),
        ),
        ServerError::BadRequest(message) => (StatusCode::BAD_REQUEST, ErrorBody::Message(message)),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = status_and_body(self);
        (status, Json(Error { error })).into_response()
    }
}

impl From<YnabError> for ServerError {
    fn from(value: YnabError) -> Self {
        Self::Upstream(value)
    }
}

impl From<DbErr> for ServerError {
    fn from(value: DbErr) -> Self {
        Self::Database(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: u16, name: &str) -> ServerError {
        ServerError::Upstream(YnabError::Upstream {
            status: ynab::StatusCode::from_u16(status).unwrap(),
            error: ErrorDetail {
                id: status.to_string(),
                name: name.to_string(),
                detail: "detail".to_string(),
            },
        })
    }

    #[test]
    fn upstream_status_is_forwarded() {
        for (status, name) in [
            (400, "bad_request"),
            (401, "unauthorized"),
            (403, "subscription_lapsed"),
            (404, "not_found"),
            (429, "too_many_requests"),
            (500, "internal_server_error"),
            (503, "service_unavailable"),
        ] {
            let res = upstream(status, name).into_response();
            assert_eq!(res.status().as_u16(), status);
        }
    }

    #[test]
    fn upstream_body_keeps_detail() {
        let (_, body) = status_and_body(upstream(404, "not_found"));
        let json = serde_json::to_value(Error { error: body }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": {"id": "404", "name": "not_found", "detail": "detail"}
            })
        );
    }

    #[test]
    fn misconfiguration_maps_to_500() {
        let res = ServerError::Upstream(YnabError::OAuthNotConfigured).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn undecodable_answer_maps_to_502() {
        let err = ServerError::Upstream(YnabError::Decode("missing field `budget`".to_string()));
        let (status, body) = status_and_body(err);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let json = serde_json::to_value(Error { error: body }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": "unexpected answer from budgeting service"})
        );
    }

    #[test]
    fn database_maps_to_500() {
        let res = ServerError::from(DbErr::Custom("boom".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let res = ServerError::Unauthorized.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bad_request_maps_to_400() {
        let (status, body) = status_and_body(ServerError::BadRequest("bad".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json = serde_json::to_value(Error { error: body }).unwrap();
        assert_eq!(json, serde_json::json!({"error": "bad"}));
    }
}
