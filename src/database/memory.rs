use async_trait::async_trait;
use chrono::Utc;
use error_stack::Report;
use parking_lot::Mutex;
use std::collections::BTreeMap;

use super::{Constraint, Error, FeedbackStore, Result, UserStore};
use crate::{
    schema::{Feedback, NewFeedback, NewUser, User},
    types::id::FeedbackId,
};

/// [`Store`](super::Store) keeping everything in process memory.
///
/// Every operation holds the lock for its whole duration so
/// uniqueness checks and cascading deletes are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<String, User>,
    feedback: BTreeMap<FeedbackId, Feedback>,
    last_id: u64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    #[tracing::instrument(skip_all, fields(username = user.username), name = "memory.users.insert")]
    async fn insert_user(&self, user: NewUser<'_>) -> Result<User> {
        let mut inner = self.inner.lock();
        if inner.users.contains_key(user.username) {
            return Err(Report::new(Error::UniqueViolation(Constraint::Username)));
        }
        if inner.users.values().any(|v| v.email == user.email) {
            return Err(Report::new(Error::UniqueViolation(Constraint::Email)));
        }

        let user = User {
            username: user.username.to_string(),
            password_hash: user.password_hash.to_string(),
            email: user.email.to_string(),
            first_name: user.first_name.to_string(),
            last_name: user.last_name.to_string(),
            created_at: Utc::now().naive_utc(),
        };
        inner.users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    #[tracing::instrument(skip(self), name = "memory.users.find")]
    async fn find_user(&self, username: &str) -> Result<Option<User>> {
        Ok(self.inner.lock().users.get(username).cloned())
    }

    #[tracing::instrument(skip(self), name = "memory.users.delete")]
    async fn delete_user(&self, username: &str) -> Result<bool> {
        let mut inner = self.inner.lock();
        if inner.users.remove(username).is_none() {
            return Ok(false);
        }
        inner.feedback.retain(|_, v| v.username != username);
        Ok(true)
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    #[tracing::instrument(
        skip_all,
        fields(username = feedback.username),
        name = "memory.feedbacks.insert"
    )]
    async fn insert_feedback(&self, feedback: NewFeedback<'_>) -> Result<Feedback> {
        let mut inner = self.inner.lock();
        if !inner.users.contains_key(feedback.username) {
            return Err(Report::new(Error::MissingReference));
        }

        inner.last_id += 1;
        let feedback = Feedback {
            id: FeedbackId::new(inner.last_id),
            title: feedback.title.to_string(),
            content: feedback.content.to_string(),
            username: feedback.username.to_string(),
            created_at: Utc::now().naive_utc(),
        };
        inner.feedback.insert(feedback.id, feedback.clone());
        Ok(feedback)
    }

    #[tracing::instrument(skip(self), name = "memory.feedbacks.find")]
    async fn find_feedback(&self, id: FeedbackId) -> Result<Option<Feedback>> {
        Ok(self.inner.lock().feedback.get(&id).cloned())
    }

    #[tracing::instrument(skip(self, title, content), name = "memory.feedbacks.update")]
    async fn update_feedback(
        &self,
        id: FeedbackId,
        title: &str,
        content: &str,
    ) -> Result<Option<Feedback>> {
        let mut inner = self.inner.lock();
        Ok(inner.feedback.get_mut(&id).map(|feedback| {
            feedback.title = title.to_string();
            feedback.content = content.to_string();
            feedback.clone()
        }))
    }

    #[tracing::instrument(skip(self), name = "memory.feedbacks.delete")]
    async fn delete_feedback(&self, id: FeedbackId) -> Result<bool> {
        Ok(self.inner.lock().feedback.remove(&id).is_some())
    }

    #[tracing::instrument(skip(self), name = "memory.feedbacks.list")]
    async fn list_feedback(&self, username: &str) -> Result<Vec<Feedback>> {
        // Ids are handed out in insertion order already.
        let inner = self.inner.lock();
        Ok(inner
            .feedback
            .values()
            .filter(|v| v.username == username)
            .cloned()
            .collect())
    }
}
