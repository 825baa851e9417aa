use crate::app::cli::Cli;
use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Empty only when `list_databases` is set.
    pub schema: String,
    pub pretty: bool,
    pub list_databases: bool,
}

pub fn resolve_config(cli: Cli) -> Result<AppConfig> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    resolve_config_with(cli, |key| env::var(key).ok())
}

/// Same as [`resolve_config`], reading fallbacks through `lookup` instead of the
/// process environment.
pub fn resolve_config_with<F>(cli: Cli, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let host = cli
        .host
        .or_else(|| lookup("DB_HOST"))
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = match cli.port {
        Some(port) => port,
        None => match lookup("DB_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("DB_PORT must be a port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        },
    };

    let user = cli
        .user
        .or_else(|| lookup("DB_USERNAME"))
        .context("user must be set via --user or DB_USERNAME in .env/environment variables")?;

    let password = cli
        .password
        .or_else(|| lookup("DB_PASSWORD"))
        .unwrap_or_default();

    let schema = cli.schema.or_else(|| lookup("DB_SCHEMA"));
    let schema = if cli.list_databases {
        schema.unwrap_or_default()
    } else {
        schema.context(
            "schema must be set via --schema or DB_SCHEMA in .env/environment variables",
        )?
    };

    Ok(AppConfig {
        host,
        port,
        user,
        password,
        schema,
        pretty: cli.pretty,
        list_databases: cli.list_databases,
    })
}
