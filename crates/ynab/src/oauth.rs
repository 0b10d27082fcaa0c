//! OAuth2 authorization-code flow against the budgeting service.

use api_types::ynab::Token;
use reqwest::Url;
use serde::Deserialize;

use crate::{ResultYnab, YnabClient, YnabError};

pub const DEFAULT_AUTHORIZE_ENDPOINT: &str = "https://app.ynab.com/oauth/authorize";
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://app.ynab.com/oauth/token";

/// Registered OAuth application.
#[derive(Clone, Debug)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    /// Callback the service redirects to with `code` and `state`.
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl OAuthSettings {
    pub(crate) fn validate(&self) -> ResultYnab<()> {
        for url in [
            &self.authorize_endpoint,
            &self.token_endpoint,
            &self.redirect_uri,
        ] {
            Url::parse(url).map_err(|err| YnabError::InvalidUrl(format!("{url}: {err}")))?;
        }
        Ok(())
    }
}

/// Error body of the token endpoint (RFC 6749, section 5.2).
#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    error_description: Option<String>,
}

impl YnabClient {
    fn oauth_settings(&self) -> ResultYnab<&OAuthSettings> {
        self.oauth.as_ref().ok_or(YnabError::OAuthNotConfigured)
    }

    /// URL the user agent is sent to in order to grant access.
    pub fn authorize_url(&self, state: &str) -> ResultYnab<Url> {
        let oauth = self.oauth_settings()?;
        let mut params = vec![
            ("client_id", oauth.client_id.clone()),
            ("redirect_uri", oauth.redirect_uri.clone()),
            ("response_type", "code".to_string()),
            ("state", state.to_string()),
        ];
        if !oauth.scopes.is_empty() {
            params.push(("scope", oauth.scopes.join(" ")));
        }

        Url::parse_with_params(&oauth.authorize_endpoint, &params)
            .map_err(|err| YnabError::InvalidUrl(err.to_string()))
    }

    /// Exchange an authorization code for a token.
    pub async fn exchange_code(&self, code: &str) -> ResultYnab<Token> {
        let oauth = self.oauth_settings()?;
        self.request_token(
            oauth,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", oauth.redirect_uri.as_str()),
            ],
        )
        .await
    }

    /// Obtain a fresh access token from a refresh token.
    pub async fn refresh_token(&self, refresh_token: &str) -> ResultYnab<Token> {
        let oauth = self.oauth_settings()?;
        self.request_token(
            oauth,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        )
        .await
    }

    async fn request_token(
        &self,
        oauth: &OAuthSettings,
        grant: &[(&str, &str)],
    ) -> ResultYnab<Token> {
        let mut form: Vec<(&str, &str)> = vec![
            ("client_id", oauth.client_id.as_str()),
            ("client_secret", oauth.client_secret.as_str()),
        ];
        form.extend_from_slice(grant);

        tracing::debug!("POST {}", oauth.token_endpoint);
        let resp = self
            .client
            .post(&oauth.token_endpoint)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return resp.json::<Token>().await.map_err(|err| {
                tracing::warn!("unexpected token response: {err}");
                YnabError::decode(err)
            });
        }

        let err = match resp.json::<TokenErrorBody>().await {
            Ok(body) => {
                let mut err = YnabError::from_status(status, body.error_description);
                if let YnabError::Upstream { error, .. } = &mut err {
                    error.name = body.error;
                }
                err
            }
            Err(_) => YnabError::from_status(status, None),
        };
        tracing::warn!("token request rejected: {err}");
        Err(err)
    }
}
