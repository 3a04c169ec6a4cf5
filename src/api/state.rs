use std::sync::Arc;

use crate::Database;

/// Shared state for API handlers.
pub struct AppState {
    pub db: Arc<Database>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
        }
    }
}
