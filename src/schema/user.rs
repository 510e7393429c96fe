use chrono::NaiveDateTime;
use error_stack::{Report, Result, ResultExt};
use serde::Serialize;
use sqlx::FromRow;
use std::fmt::{Debug, Display};
use thiserror::Error;
use tokio::task::spawn_blocking;

use crate::{
    auth::{password, Owned},
    database::{self, Constraint, UserStore},
    types::RegisterInput,
    util::Sensitive,
};

#[derive(Clone, FromRow, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: NaiveDateTime,
}

impl Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password_hash", &"<hidden>")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl Owned for User {
    fn owner(&self) -> &str {
        &self.username
    }
}

/// Values of a user about to be inserted. The password must
/// already be hashed at this point.
#[derive(Clone, Copy)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

impl Debug for NewUser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Username,
    Email,
}

impl Display for DuplicateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Username => f.write_str("username"),
            Self::Email => f.write_str("email"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreateUserError {
    #[error("{0} is already taken")]
    Duplicate(DuplicateField),
    #[error("Failed to create user")]
    Internal,
}

#[derive(Debug, Error)]
#[error("Failed to authenticate user")]
pub struct AuthenticateError;

impl User {
    /// Inserts the user. A taken username or email comes back as
    /// [`CreateUserError::Duplicate`] and nothing is stored.
    #[tracing::instrument(skip(store))]
    pub async fn create<S: UserStore + ?Sized>(
        store: &S,
        new: NewUser<'_>,
    ) -> Result<Self, CreateUserError> {
        store.insert_user(new).await.map_err(|report| {
            let context = match report.current_context() {
                database::Error::UniqueViolation(Constraint::Username) => {
                    CreateUserError::Duplicate(DuplicateField::Username)
                }
                database::Error::UniqueViolation(Constraint::Email) => {
                    CreateUserError::Duplicate(DuplicateField::Email)
                }
                _ => CreateUserError::Internal,
            };
            report.change_context(context)
        })
    }

    #[tracing::instrument(skip(store))]
    pub async fn find_by_username<S: UserStore + ?Sized>(
        store: &S,
        username: &str,
    ) -> database::Result<Option<Self>> {
        store.find_user(username).await
    }

    /// Deletes the user with all of their feedback.
    #[tracing::instrument(skip_all, fields(username = %self.username))]
    pub async fn delete<S: UserStore + ?Sized>(&self, store: &S) -> database::Result<bool> {
        store.delete_user(&self.username).await
    }

    /// Hashes the password and creates the user from the form.
    ///
    /// Hashing happens before anything reaches the store, the plain
    /// password is never handed to it.
    #[tracing::instrument(skip_all, fields(username = %input.username))]
    pub async fn register<S: UserStore + ?Sized>(
        store: &S,
        input: &RegisterInput,
    ) -> Result<Self, CreateUserError> {
        let password = input.password.clone();
        let password_hash = spawn_blocking(move || password::hash(password.as_str()))
            .await
            .change_context(CreateUserError::Internal)?
            .change_context(CreateUserError::Internal)?;

        Self::create(
            store,
            NewUser {
                username: &input.username,
                password_hash: &password_hash,
                email: &input.email,
                first_name: &input.first_name,
                last_name: &input.last_name,
            },
        )
        .await
    }

    /// Returns the user only if the password matches.
    ///
    /// `None` means either there is no such user or the password is
    /// wrong. Both take about the same time.
    #[tracing::instrument(skip(store, password))]
    pub async fn authenticate<S: UserStore + ?Sized>(
        store: &S,
        username: &str,
        password: &Sensitive<String>,
    ) -> Result<Option<Self>, AuthenticateError> {
        let user = Self::find_by_username(store, username)
            .await
            .change_context(AuthenticateError)?;

        let password = password.clone();
        let stored_hash = user.as_ref().map(|v| v.password_hash.clone());
        let matched = spawn_blocking(move || match stored_hash {
            Some(hash) => password::verify(password.as_str(), &hash),
            None => password::verify_dummy(password.as_str()),
        })
        .await
        .map_err(|e| Report::new(e).change_context(AuthenticateError))?;

        Ok(user.filter(|_| matched))
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn input(username: &str, email: &str) -> RegisterInput {
        RegisterInput {
            username: username.into(),
            password: "pw123".into(),
            email: email.into(),
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
        }
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let store = MemoryStore::new();
        let user = User::register(&store, &input("alice", "a@x.com"))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "pw123");

        let found = User::authenticate(&store, "alice", &"pw123".into())
            .await
            .unwrap();
        assert_eq!(found, Some(user));

        let wrong = User::authenticate(&store, "alice", &"pw1234".into())
            .await
            .unwrap();
        assert_eq!(wrong, None);

        let missing = User::authenticate(&store, "bob", &"pw123".into())
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_register_duplicates() {
        let store = MemoryStore::new();
        User::register(&store, &input("alice", "a@x.com"))
            .await
            .unwrap();

        let error = User::register(&store, &input("alice", "b@x.com"))
            .await
            .unwrap_err();
        assert_eq!(
            error.current_context(),
            &CreateUserError::Duplicate(DuplicateField::Username)
        );

        let error = User::register(&store, &input("bob", "a@x.com"))
            .await
            .unwrap_err();
        assert_eq!(
            error.current_context(),
            &CreateUserError::Duplicate(DuplicateField::Email)
        );

        // the failed attempts left nothing behind
        assert!(User::find_by_username(&store, "bob")
            .await
            .unwrap()
            .is_none());
        let alice = User::find_by_username(&store, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alice.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_debug_hides_hash() {
        let store = MemoryStore::new();
        let user = User::register(&store, &input("alice", "a@x.com"))
            .await
            .unwrap();
        assert!(!format!("{user:?}").contains(&user.password_hash));
    }
}
