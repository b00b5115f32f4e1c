//! Shared handler state.

use crate::people_api::PeopleInfoClient;
use std::sync::Arc;
use timetrack_core::db::DbPool;

#[derive(Clone)]
pub struct AppState {
    /// Pooled SQLite connections; one is checked out per request.
    pub pool: DbPool,
    /// Registration enrichment; `None` registers with an empty profile.
    pub people_api: Option<Arc<PeopleInfoClient>>,
}

impl AppState {
    pub fn new(pool: DbPool, people_api: Option<PeopleInfoClient>) -> Self {
        Self {
            pool,
            people_api: people_api.map(Arc::new),
        }
    }
}
