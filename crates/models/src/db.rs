use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::env;

use configs::DatabaseConfig;

/// Connect using `DATABASE_URL` (after loading `.env` if present).
pub async fn connect() -> anyhow::Result<DatabaseConnection> {
    let _ = dotenvy::dotenv();
    let url = env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
    let db = Database::connect(url.as_str()).await?;
    Ok(db)
}

/// Open the shared pool described by `cfg`. The pool is closed by the caller at shutdown.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opts).await?;
    tracing::info!(event = "db_connected", sqlx_logging = cfg.sqlx_logging, "database pool opened");
    Ok(db)
}
