use async_trait::async_trait;
use error_stack::{Report, ResultExt};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::{fmt::Debug, str::FromStr, time::Duration};

use crate::{
    config,
    schema::{Feedback, NewFeedback, NewUser, User},
    types::id::FeedbackId,
};

mod error;
mod memory;
mod postgres;

pub use error::*;
pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type Transaction<'a> = sqlx::Transaction<'a, sqlx::Postgres>;
pub type PoolConnection = sqlx::pool::PoolConnection<sqlx::Postgres>;

/// Persistence of user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. Taken usernames or emails are reported
    /// as [`Error::UniqueViolation`] and nothing is stored.
    async fn insert_user(&self, user: NewUser<'_>) -> Result<User>;

    async fn find_user(&self, username: &str) -> Result<Option<User>>;

    /// Deletes the user and every feedback they own in one
    /// atomic unit. Returns `false` if there is no such user.
    async fn delete_user(&self, username: &str) -> Result<bool>;
}

/// Persistence of feedback owned by users.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Fails with [`Error::MissingReference`] if the owner does not exist.
    async fn insert_feedback(&self, feedback: NewFeedback<'_>) -> Result<Feedback>;

    async fn find_feedback(&self, id: FeedbackId) -> Result<Option<Feedback>>;

    /// Replaces title and content, returning the updated feedback
    /// or `None` if it does not exist anymore.
    async fn update_feedback(
        &self,
        id: FeedbackId,
        title: &str,
        content: &str,
    ) -> Result<Option<Feedback>>;

    async fn delete_feedback(&self, id: FeedbackId) -> Result<bool>;

    /// Feedback of the user ordered from the oldest one.
    async fn list_feedback(&self, username: &str) -> Result<Vec<Feedback>>;
}

/// Everything the application needs from its storage.
pub trait Store: UserStore + FeedbackStore + Debug {}

impl<T: UserStore + FeedbackStore + Debug> Store for T {}

#[derive(Clone)]
pub struct Pool {
    pool: sqlx::PgPool,
}

impl Pool {
    pub async fn new(cfg: &config::Database) -> Result<Self> {
        let mut pool_opts = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(cfg.timeout_secs.get()))
            .max_connections(cfg.pool_size.get());

        if let Some(min_idle) = cfg.min_idle {
            pool_opts = pool_opts.min_connections(min_idle.get());
        }

        let mut connect_opts =
            PgConnectOptions::from_str(cfg.url.as_str()).change_context(Error::InvalidUrl)?;

        if cfg.enforce_tls {
            connect_opts = connect_opts.ssl_mode(PgSslMode::Require);
        }

        let pool = Self {
            pool: pool_opts.connect_lazy_with(connect_opts),
        };

        match pool.wait_until_healthy().await {
            Ok(..) => {}
            Err(err) if err.is_unhealthy() => {
                tracing::warn!("database is not reachable yet, continuing with a lazy pool");
            }
            Err(err) => return Err(err),
        }

        Ok(pool)
    }

    #[cfg(test)]
    pub(crate) fn from_pg(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

impl Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.pool.fmt(f)
    }
}

impl Pool {
    #[must_use]
    pub fn connections(&self) -> u32 {
        self.pool.size()
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.connections() > 0
    }

    /// An empty pool still tries to open a new connection, bounded by
    /// the configured acquire timeout.
    #[tracing::instrument(name = "db.transaction", skip(self))]
    pub async fn begin(&self) -> Result<Transaction<'static>> {
        if let Some(inner) = self.pool.try_begin().await.into_db_error()? {
            return Ok(inner);
        }
        self.pool.begin().await.into_db_error()
    }

    #[tracing::instrument(name = "db.connect", skip(self))]
    pub async fn get(&self) -> Result<PoolConnection> {
        if let Some(inner) = self.pool.try_acquire() {
            return Ok(inner);
        }
        self.pool.acquire().await.into_db_error()
    }

    #[tracing::instrument(skip(self))]
    pub async fn wait_until_healthy(&self) -> Result<()> {
        match self.pool.acquire().await {
            Ok(..) => Ok(()),
            Err(e) if !self.is_healthy() => {
                Err(Report::new(e).change_context(Error::UnhealthyPool))
            }
            Err(e) => Err(e).into_db_error(),
        }
    }

    #[tracing::instrument(name = "db.migrate", skip(self))]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .change_context(Error::Migration)
    }
}
