use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    /// Map an insert failure, turning unique violations into `Conflict(conflict_msg)`.
    pub fn from_insert(err: DbErr, conflict_msg: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ModelError::Conflict(conflict_msg.into()),
            _ => ModelError::Db(err.to_string()),
        }
    }
}
