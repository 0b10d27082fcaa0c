//! Handles settings for the application.
//!
//! Settings are read from an optional TOML file (`config/ursaring.toml` by
//! default, see `--config`) and then from environment variables prefixed
//! with `URSARING_`, sections separated by `__`
//! (e.g. `URSARING_SERVER__PORT=8080`).
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/ursaring.toml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    /// Log level filter applied to every crate of the service.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub api_prefix: String,
    pub database: Database,
    pub secure_cookies: bool,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: 8000,
            api_prefix: "/api/v1".to_string(),
            database: Database::Sqlite("ursaring.db".to_string()),
            secure_cookies: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OAuth {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_authorize_endpoint")]
    pub authorize_endpoint: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_authorize_endpoint() -> String {
    ynab::DEFAULT_AUTHORIZE_ENDPOINT.to_string()
}

fn default_token_endpoint() -> String {
    ynab::DEFAULT_TOKEN_ENDPOINT.to_string()
}

fn default_scopes() -> Vec<String> {
    vec!["read-only".to_string()]
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ynab {
    pub api_base_url: String,
    pub oauth: Option<OAuth>,
}

impl Default for Ynab {
    fn default() -> Self {
        Self {
            api_base_url: ynab::DEFAULT_API_BASE_URL.to_string(),
            oauth: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub ynab: Ynab,
}

#[derive(Debug, Parser)]
#[command(name = "ursaring", about = "Spending transactions from your budget")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the listening port.
    #[arg(long)]
    port: Option<u16>,
    /// Override the log level (e.g. debug).
    #[arg(long)]
    level: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self> {
        let args = Args::parse();

        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings: Settings = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                Environment::with_prefix("URSARING")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if let Some(port) = args.port {
            settings.server.port = port;
        }
        if let Some(level) = args.level {
            settings.app.level = level;
        }

        Ok(settings)
    }

    pub fn oauth(&self) -> Option<ynab::OAuthSettings> {
        self.ynab.oauth.as_ref().map(|oauth| ynab::OAuthSettings {
            client_id: oauth.client_id.clone(),
            client_secret: oauth.client_secret.clone(),
            authorize_endpoint: oauth.authorize_endpoint.clone(),
            token_endpoint: oauth.token_endpoint.clone(),
            redirect_uri: oauth.redirect_uri.clone(),
            scopes: oauth.scopes.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_apply_to_empty_file() {
        let settings = from_toml("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.server.api_prefix, "/api/v1");
        assert!(settings.server.secure_cookies);
        assert_eq!(settings.ynab.api_base_url, ynab::DEFAULT_API_BASE_URL);
        assert!(settings.oauth().is_none());
    }

    #[test]
    fn full_file_is_parsed() {
        let settings = from_toml(
            r#"
            [app]
            level = "debug"

            [server]
            port = 9000
            database = "memory"
            secure_cookies = false

            [ynab.oauth]
            client_id = "id"
            client_secret = "secret"
            redirect_uri = "http://localhost:9000/api/v1/auth/ynab/callback"
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.port, 9000);
        assert!(matches!(settings.server.database, Database::Memory));
        let oauth = settings.oauth().unwrap();
        assert_eq!(oauth.token_endpoint, ynab::DEFAULT_TOKEN_ENDPOINT);
        assert_eq!(oauth.scopes, vec!["read-only".to_string()]);
    }

    #[test]
    fn sqlite_path_is_parsed() {
        let settings = from_toml(
            r#"
            [server.database]
            sqlite = "/var/lib/ursaring/db.sqlite"
            "#,
        );
        assert!(matches!(
            settings.server.database,
            Database::Sqlite(ref path) if path == "/var/lib/ursaring/db.sqlite"
        ));
    }
}
