use std::time::Duration;

use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

/// Idle and lifetime limit for the in-memory connection; recycling it would
/// open a new, empty database.
pub const IN_MEMORY_KEEP_ALIVE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 10);

/// Pool options for `cfg`.
pub fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);

    if cfg.is_in_memory() {
        // one connection, kept alive, or the schema vanishes
        opts.max_connections(1)
            .min_connections(1)
            .idle_timeout(IN_MEMORY_KEEP_ALIVE)
            .max_lifetime(IN_MEMORY_KEEP_ALIVE);
    } else {
        opts.max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs));
    }
    opts
}

pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = Database::connect(connect_options(cfg)).await?;
    info!(
        backend = ?db.get_database_backend(),
        in_memory = cfg.is_in_memory(),
        "database connected"
    );
    Ok(db)
}
