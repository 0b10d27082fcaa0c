//! Client for the budgeting service API.
//!
//! It fetches the last used budget of a user and talks to the OAuth2 token
//! endpoint. Every request is authenticated with a bearer token owned by the
//! caller; the client itself keeps no per-user state.

use api_types::{
    error::ErrorResponse,
    ynab::{BudgetDetail, BudgetDetailResponse, User, UserResponse},
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

pub use error::YnabError;
pub use oauth::{DEFAULT_AUTHORIZE_ENDPOINT, DEFAULT_TOKEN_ENDPOINT, OAuthSettings};
pub use reqwest::StatusCode;

mod error;
mod oauth;

pub const DEFAULT_API_BASE_URL: &str = "https://api.ynab.com/v1";

type ResultYnab<T> = Result<T, YnabError>;

#[derive(Clone, Debug)]
pub struct YnabClient {
    client: Client,
    base_url: String,
    oauth: Option<OAuthSettings>,
}

impl YnabClient {
    /// Return a builder for `YnabClient`.
    pub fn builder() -> YnabClientBuilder {
        YnabClientBuilder::default()
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, token: &str, path: &str) -> ResultYnab<T> {
        tracing::debug!("GET {path}");
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return resp.json::<T>().await.map_err(|err| {
                tracing::warn!("unexpected body for GET {path}: {err}");
                YnabError::decode(err)
            });
        }

        let err = match resp.json::<ErrorResponse>().await {
            Ok(body) => YnabError::Upstream {
                status,
                error: body.error,
            },
            Err(_) => YnabError::from_status(status, None),
        };
        tracing::warn!("budgeting service rejected GET {path}: {err}");
        Err(err)
    }

    /// Fetch the full snapshot of the last used budget.
    pub async fn budget(&self, token: &str) -> ResultYnab<BudgetDetail> {
        let res: BudgetDetailResponse = self.get_json(token, "/budgets/last-used").await?;
        Ok(res.data.budget)
    }

    /// Fetch the user owning `token`.
    pub async fn user(&self, token: &str) -> ResultYnab<User> {
        let res: UserResponse = self.get_json(token, "/user").await?;
        Ok(res.data.user)
    }
}

#[derive(Default)]
pub struct YnabClientBuilder {
    client: Option<Client>,
    base_url: Option<String>,
    oauth: Option<OAuthSettings>,
}

impl YnabClientBuilder {
    /// Use an existing HTTP client (connection pool).
    pub fn client(mut self, client: Client) -> YnabClientBuilder {
        self.client = Some(client);
        self
    }

    /// API base url, defaults to [`DEFAULT_API_BASE_URL`].
    pub fn base_url(mut self, base_url: &str) -> YnabClientBuilder {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn oauth(mut self, oauth: OAuthSettings) -> YnabClientBuilder {
        self.oauth = Some(oauth);
        self
    }

    pub fn build(self) -> ResultYnab<YnabClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Url::parse(&base_url).map_err(|err| YnabError::InvalidUrl(format!("{base_url}: {err}")))?;
        if let Some(oauth) = &self.oauth {
            oauth.validate()?;
        }

        Ok(YnabClient {
            client: self.client.unwrap_or_default(),
            base_url,
            oauth: self.oauth,
        })
    }
}
