mod config;
mod demo;

use anyhow::Context;
use axum::{response::Redirect, routing::get, Router};
use clap::Parser;
use sql_forms::{PostgresProvider, SqlFormsLayer, SqliteProvider};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{PgPool, SqlitePool};
use tower_http::trace::TraceLayer;

use crate::config::{Backend, Config};

/// The shared pool, kept so it can be closed on shutdown
enum DatabasePool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl DatabasePool {
    async fn close(&self) {
        match self {
            DatabasePool::Postgres(pool) => pool.close().await,
            DatabasePool::Sqlite(pool) => pool.close().await,
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::parse();
    let mount_path = config.mount_path()?;

    let (forms_router, pool) = match config.backend()? {
        Backend::Postgres(options) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(options)
                .await
                .context("Error connecting to the database")?;

            if config.seed_demo {
                demo::seed(&PostgresProvider::new(pool.clone())).await?;
            }

            let layer = SqlFormsLayer::postgres(mount_path.clone(), pool.clone())
                .with_title(config.title.clone());
            (layer.into_router(), DatabasePool::Postgres(pool))
        }
        Backend::Sqlite(options) => {
            let pool = SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(options)
                .await
                .context("Error connecting to the database")?;

            if config.seed_demo {
                demo::seed(&SqliteProvider::new(pool.clone())).await?;
            }

            let layer = SqlFormsLayer::sqlite(mount_path.clone(), pool.clone())
                .with_title(config.title.clone());
            (layer.into_router(), DatabasePool::Sqlite(pool))
        }
    };

    let redirect_target = mount_path.clone();
    let app = Router::new()
        .route("/", get(move || async move { Redirect::to(&redirect_target) }))
        .merge(forms_router)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen))?;

    tracing::info!("Forms available at http://{}{}", config.listen, mount_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::error!(%error, "failed to listen for shutdown signal");
            }
        })
        .await
        .context("Server error")?;

    pool.close().await;
    tracing::info!("database connection closed");
    Ok(())
}
