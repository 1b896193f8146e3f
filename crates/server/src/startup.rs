use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::{init_logging_default, init_logging_json};
use configs::{AppConfig, Environment};
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::state::ServerState;

/// Initialize logging via shared common utils; JSON lines in production.
pub fn init_logging(environment: Environment) {
    match environment {
        Environment::Production => init_logging_json(),
        Environment::Development | Environment::Testing => init_logging_default(),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn load_bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(cfg.server.bind_addr().parse()?)
}

/// Connect, migrate and assemble the router for a loaded configuration.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    // create or upgrade tables before serving
    migration::Migrator::up(&db, None).await?;
    info!(event = "migrated", "database schema up to date");

    Ok(routes::build_router(ServerState::new(db), build_cors()))
}

/// Run the HTTP server for an already loaded configuration.
pub async fn serve(cfg: AppConfig) -> anyhow::Result<()> {
    info!(environment = %cfg.environment, "environment configured");
    let app = build_app(&cfg).await?;

    let addr = load_bind_addr(&cfg)?;
    info!(%addr, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
