#![cfg(test)]
use std::path::PathBuf;

use migration::MigratorTrait;
use models::db::connect_with_config;
use models::{school, student};
use sea_orm::DatabaseConnection;

/// Fresh in-memory database with migrations applied; one per test.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = configs::DatabaseConfig::in_memory();
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// SQLite file under the temp dir, removed with its journal files on drop.
pub struct FileDb {
    pub db: DatabaseConnection,
    path: PathBuf,
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(p);
        }
    }
}

/// Migrated file-backed database using the regular pool settings, so
/// several connections write to it at once.
pub async fn get_file_db() -> Result<FileDb, anyhow::Error> {
    let path = std::env::temp_dir().join(format!("school-registry-{}.db", uuid::Uuid::new_v4()));
    let cfg = configs::DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        ..Default::default()
    };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(FileDb { db, path })
}

pub struct Fixture {
    /// capacity 2, full: Jordi Pujol and Maria Doblas
    pub gracia: school::Model,
    /// capacity 100, empty
    pub eixample: school::Model,
}

pub async fn seed(db: &DatabaseConnection) -> Result<Fixture, anyhow::Error> {
    let gracia = school::create(db, "Escola Gracia", 2).await?;
    let eixample = school::create(db, "Escola Eixample", 100).await?;
    student::create(db, "ST-000001", "Jordi", "Pujol", gracia.id).await?;
    student::create(db, "ST-000002", "Maria", "Doblas", gracia.id).await?;
    Ok(Fixture { gracia, eixample })
}
