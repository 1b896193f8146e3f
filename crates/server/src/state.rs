use sea_orm::DatabaseConnection;

/// Shared handler state. The database handle is passed explicitly to every
/// service call; nothing reaches for a process-wide session.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
}

impl ServerState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}
