use error_stack::{Result, ResultExt};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    config,
    database::{self, PgStore, Store},
    http::SessionKeys,
};

/// Shared state of every request, constructed once at start.
#[derive(Debug, Clone)]
pub struct App {
    pub config: Arc<config::Server>,
    pub store: Arc<dyn Store>,
    pub sessions: SessionKeys,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
    /// Connects to Postgres and applies pending migrations.
    #[tracing::instrument(skip_all)]
    pub async fn new(cfg: config::Server) -> Result<Self, AppError> {
        let pool = database::Pool::new(&cfg.db).await.change_context(AppError)?;
        pool.migrate().await.change_context(AppError)?;

        Ok(Self::with_store(cfg, Arc::new(PgStore::new(pool))))
    }

    #[must_use]
    pub fn with_store(cfg: config::Server, store: Arc<dyn Store>) -> Self {
        let sessions = SessionKeys::new(&cfg.session);
        Self {
            config: Arc::new(cfg),
            store,
            sessions,
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        &*self.store
    }
}
