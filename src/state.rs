use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::store::{DynJournalStore, SqliteJournalStore};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub store: DynJournalStore,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let store = SqliteJournalStore::new(db.clone(), config.naming, config.auth.bcrypt_cost);
        Self {
            db,
            config,
            store: Arc::new(store),
        }
    }
}
