use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use common::remote::HostedDataClient;
use configs::AppConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes;
use crate::state::AppState;
use service::remote::HostedTableSource;
use service::user_record::{RecordService, SeaOrmUserRecordRepository};

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Wire the store-backed repository and the hosted-data source into handler state.
pub fn build_state(db: DatabaseConnection, cfg: &AppConfig) -> AppState {
    if !cfg.remote.is_configured() {
        warn!(event = "remote_unconfigured", "SUPABASE_URL not set; /supabase-data will fail");
    }
    let client = HostedDataClient::new(cfg.remote.base_url.clone(), cfg.remote.api_key.clone());
    let records = RecordService::new(
        Arc::new(SeaOrmUserRecordRepository::new(db)),
        Arc::new(HostedTableSource::new(client, cfg.remote.table.clone())),
    );
    AppState::new(records)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(event = "shutdown_signal", "shutting down");
}

/// Serve with an already loaded config until a shutdown signal, then close the pool.
/// Logging and `.env` are the caller's job.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    // one pool for the whole process
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!(event = "migrations_applied", "store schema up to date");
    }

    let state = build_state(db.clone(), &cfg);
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server running");
    // in-flight requests finish before this returns
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // release pooled connections before the runtime goes away
    db.close().await?;
    info!(event = "db_closed", "database pool closed");
    Ok(())
}
