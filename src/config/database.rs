use serde::Deserialize;
use std::borrow::Cow;
use std::num::{NonZeroU32, NonZeroU64};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::util::Sensitive;

/// Configuration for connecting to the Postgres database
#[derive(Debug, Deserialize)]
pub struct Database {
    /// Connection URL connecting to the Postgres database.
    ///
    /// **Environment variables**:
    /// - `FEEDBACK_DB_URL` or `DATABASE_URL`
    pub url: Sensitive<String>,
    /// Minimum idle database connections just to avoid wasting
    /// hardware resources from the database server.
    ///
    /// **Environment variables**:
    /// - `FEEDBACK_DB_MIN_IDLE`
    pub min_idle: Option<NonZeroU32>,
    /// Maximum amount of pool size that database can handle
    ///
    /// **Environment variables**:
    /// - `FEEDBACK_DB_POOL_SIZE`
    #[serde(default = "Database::default_pool_size")]
    pub pool_size: NonZeroU32,
    /// How long this server can wait until its time limit where the
    /// database connection takes a while to acknowledge or
    /// successfully established.
    ///
    /// **Environment variables**:
    /// - `FEEDBACK_DB_TIMEOUT_SECS`
    #[serde(default = "Database::default_timeout_secs")]
    pub timeout_secs: NonZeroU64,
    /// Forces all database connections are encrypted with TLS
    /// (if possible).
    ///
    /// **Environment variables**:
    /// - `FEEDBACK_DB_ENFORCE_TLS`
    #[serde(default)]
    pub enforce_tls: bool,
}

impl Database {
    const DEFAULT_POOL_SIZE: u32 = 5;
    const DEFAULT_TIMEOUT_SECS: u64 = 5;

    // Required by serde
    const fn default_pool_size() -> NonZeroU32 {
        match NonZeroU32::new(Self::DEFAULT_POOL_SIZE) {
            Some(n) => n,
            None => panic!("DEFAULT_POOL_SIZE is accidentally set to 0"),
        }
    }

    const fn default_timeout_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_TIMEOUT_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_TIMEOUT_SECS is accidentally set to 0"),
        }
    }

    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Sensitive::new(url.into()),
            min_idle: None,
            pool_size: Self::default_pool_size(),
            timeout_secs: Self::default_timeout_secs(),
            enforce_tls: false,
        }
    }
}

impl Validate for Database {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if url::Url::parse(self.url.as_str()).is_err() {
            let mut error = ValidationError::new("url");
            error.message = Some(Cow::Borrowed("Invalid Postgres connection URL"));
            errors.add("url", error);
        }

        if let Some(min_idle) = self.min_idle {
            if min_idle.get() > self.pool_size.get() {
                let mut error = ValidationError::new("range");
                error.message = Some(Cow::Borrowed("must not exceed pool_size"));
                errors.add("min_idle", error);
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
