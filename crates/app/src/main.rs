use migration::{Migrator, MigratorTrait};
use server::{ServerSettings, ServerState};
use settings::Database;
use ynab::YnabClient;

use crate::error::Result;

mod error;
mod settings;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ursaring={level},server={level},ynab={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;

    let mut ynab = YnabClient::builder().base_url(&settings.ynab.api_base_url);
    match settings.oauth() {
        Some(oauth) => ynab = ynab.oauth(oauth),
        None => tracing::warn!("no OAuth settings found, login is disabled"),
    }
    let ynab = ynab.build()?;

    let state = ServerState::new(
        db,
        ynab,
        ServerSettings {
            api_prefix: settings.server.api_prefix.clone(),
            secure_cookies: settings.server.secure_cookies,
        },
    );

    let bind = settings
        .server
        .bind
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    server::run_with_listener(state, listener).await?;
    Ok(())
}

async fn parse_database(config: &Database) -> Result<sea_orm::DatabaseConnection> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
