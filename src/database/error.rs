use error_stack::Report;
use std::fmt::Display;
use thiserror::Error;

/// Database related errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// An error caused by an invalid Postgres connection url.
    #[error("invalid connection url")]
    InvalidUrl,
    /// Generic failure from the database or its driver. The source
    /// is kept in the report.
    #[error("received a database error")]
    Internal,
    /// Embedded migrations could not be applied.
    #[error("failed to run database migrations")]
    Migration,
    /// A row refers to another row that does not exist.
    #[error("referenced row does not exist")]
    MissingReference,
    /// The database is currently in read mode (most likely due
    /// to maintenance) and should not perform any writes.
    #[error("database is currently in read mode")]
    Readonly,
    /// Database pool does not have reliable connection to
    /// transact to the database.
    #[error("unhealthy database pool")]
    UnhealthyPool,
    /// Insertion is rejected because of a unique constraint.
    #[error("{0} is already taken")]
    UniqueViolation(Constraint),
}

/// Unique constraints a caller may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Email,
    Username,
    Other,
}

impl Constraint {
    #[must_use]
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("users_pkey") => Self::Username,
            Some("users_email_key") => Self::Email,
            _ => Self::Other,
        }
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Username => f.write_str("username"),
            Self::Other => f.write_str("unique value"),
        }
    }
}

/// Converts from a generic [sqlx] result into a [database compatible error](Error).
pub trait ErrorExt<T> {
    fn into_db_error(self) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, sqlx::Error> {
    fn into_db_error(self) -> Result<T> {
        self.map_err(|e| {
            let context = match &e {
                sqlx::Error::Database(err) if err.message().ends_with("read-only transaction") => {
                    Error::Readonly
                }
                sqlx::Error::Database(err) if err.is_unique_violation() => {
                    Error::UniqueViolation(Constraint::from_name(err.constraint()))
                }
                sqlx::Error::Database(err) if err.is_foreign_key_violation() => {
                    Error::MissingReference
                }
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => Error::UnhealthyPool,
                _ => Error::Internal,
            };
            Report::new(e).change_context(context)
        })
    }
}

/// Lazily typed [`std::result::Result`] but the error generic
/// is filled up with [a database error](Error).
pub type Result<T> = error_stack::Result<T, Error>;

/// Shortcuts for inspecting the current context of a
/// `Report<Error>` without matching on it every time.
pub trait ReportExt {
    fn is_unhealthy(&self) -> bool;
    fn is_readonly(&self) -> bool;
    fn unique_violation(&self) -> Option<Constraint>;
}

impl ReportExt for Report<Error> {
    fn is_unhealthy(&self) -> bool {
        matches!(self.current_context(), Error::UnhealthyPool)
    }

    fn is_readonly(&self) -> bool {
        matches!(self.current_context(), Error::Readonly)
    }

    fn unique_violation(&self) -> Option<Constraint> {
        match self.current_context() {
            Error::UniqueViolation(constraint) => Some(*constraint),
            _ => None,
        }
    }
}
