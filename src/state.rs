//! Shared application state
//!
//! Stores are held behind their port traits so tests and alternative
//! backends can be injected without touching the handlers.

use std::sync::Arc;

use crate::database::DatabaseManager;
use crate::ports::{DetailStore, InstanceRegistry};
use crate::signature::OwnershipPolicy;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn InstanceRegistry>,
    pub details: Arc<dyn DetailStore>,
    pub ownership: Arc<OwnershipPolicy>,
    pub db: DatabaseManager,
}

impl AppState {
    /// Wire the SQLite stores from an open database.
    pub fn new(db: DatabaseManager, ownership: OwnershipPolicy) -> Self {
        Self {
            registry: Arc::new(db.instance_registry()),
            details: Arc::new(db.detail_store()),
            ownership: Arc::new(ownership),
            db,
        }
    }
}
