pub mod common;
pub mod entrances;
pub mod health;
pub mod reports;

use std::sync::Arc;

use crate::db::DbPool;
use crate::services::{entrances::EntranceService, exits::ExitService, reports::ReportService};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub entrances: Arc<EntranceService>,
    pub exits: Arc<ExitService>,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            entrances: Arc::new(EntranceService::new(db.clone())),
            exits: Arc::new(ExitService::new(db.clone())),
            reports: Arc::new(ReportService::new(db)),
        }
    }
}
