//! Command line and environment configuration

use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{bail, Context};
use clap::Parser;
use sqlx::postgres::PgConnectOptions;
use sqlx::sqlite::SqliteConnectOptions;

/// Serve generated CRUD forms for every table of a database
#[derive(Parser, Debug)]
#[command(name = "forms-server", version, about)]
pub struct Config {
    /// Database host
    #[arg(long, env = "PGHOST", default_value = "localhost")]
    pub host: String,

    /// Database port
    #[arg(long, env = "PGPORT", default_value_t = 5432)]
    pub port: u16,

    /// Database name
    #[arg(long, env = "PGDATABASE", default_value = "BookSphere")]
    pub database: String,

    /// Database user
    #[arg(long, env = "PGUSER", default_value = "postgres")]
    pub user: String,

    /// Database password
    #[arg(long, env = "PGPASSWORD", default_value = "admin", hide_env_values = true)]
    pub password: String,

    /// Full connection URL, overrides the individual settings.
    /// `sqlite:` URLs use SQLite instead of PostgreSQL.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Address the HTTP server listens on
    #[arg(long, env = "FORMS_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// URL path the forms are mounted at
    #[arg(long, env = "FORMS_BASE_PATH", default_value = "/forms")]
    pub base_path: String,

    /// Page title
    #[arg(long, env = "FORMS_TITLE", default_value = sql_forms::layer::DEFAULT_TITLE)]
    pub title: String,

    /// Size of the connection pool
    #[arg(long, default_value_t = 1)]
    pub max_connections: u32,

    /// Create and fill demo `authors` and `books` tables before serving
    #[arg(long)]
    pub seed_demo: bool,
}

/// Connection settings for the selected database
pub enum Backend {
    Postgres(PgConnectOptions),
    Sqlite(SqliteConnectOptions),
}

impl Config {
    pub fn backend(&self) -> anyhow::Result<Backend> {
        match &self.database_url {
            Some(url) if url.starts_with("sqlite:") => {
                let options = SqliteConnectOptions::from_str(url)
                    .context("invalid SQLite URL")?
                    .create_if_missing(true);
                Ok(Backend::Sqlite(options))
            }
            Some(url) => Ok(Backend::Postgres(
                PgConnectOptions::from_str(url).context("invalid PostgreSQL URL")?,
            )),
            None => Ok(Backend::Postgres(
                PgConnectOptions::new()
                    .host(&self.host)
                    .port(self.port)
                    .database(&self.database)
                    .username(&self.user)
                    .password(&self.password),
            )),
        }
    }

    /// Base path without a trailing slash
    pub fn mount_path(&self) -> anyhow::Result<String> {
        let path = self.base_path.trim_end_matches('/');
        if !path.starts_with('/') {
            bail!("base path must start with '/' and must not be the root: {:?}", self.base_path);
        }
        Ok(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["forms-server"]).unwrap();
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.title, "BookSphere App");
        assert!(!config.seed_demo);
    }

    #[test]
    fn test_connection_flags() {
        let config = Config::try_parse_from([
            "forms-server",
            "--host",
            "db.internal",
            "--database",
            "Library",
            "--port",
            "6543",
        ])
        .unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.database, "Library");
        assert_eq!(config.port, 6543);
    }

    #[test]
    fn test_sqlite_url_selects_sqlite() {
        let config =
            Config::try_parse_from(["forms-server", "--database-url", "sqlite::memory:"]).unwrap();
        assert!(matches!(config.backend().unwrap(), Backend::Sqlite(_)));
    }

    #[test]
    fn test_mount_path() {
        let config = Config::try_parse_from(["forms-server", "--base-path", "/library/"]).unwrap();
        assert_eq!(config.mount_path().unwrap(), "/library");

        let config = Config::try_parse_from(["forms-server", "--base-path", "/"]).unwrap();
        assert!(config.mount_path().is_err());
    }
}
