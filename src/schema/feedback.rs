use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    auth::Owned,
    database::{self, FeedbackStore},
    types::{id::FeedbackId, FeedbackInput},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub title: String,
    pub content: String,
    pub username: String,
    pub created_at: NaiveDateTime,
}

impl Owned for Feedback {
    fn owner(&self) -> &str {
        &self.username
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewFeedback<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub username: &'a str,
}

impl Feedback {
    #[tracing::instrument(skip(store, input))]
    pub async fn create<S: FeedbackStore + ?Sized>(
        store: &S,
        owner: &str,
        input: &FeedbackInput,
    ) -> database::Result<Self> {
        store
            .insert_feedback(NewFeedback {
                title: &input.title,
                content: &input.content,
                username: owner,
            })
            .await
    }

    #[tracing::instrument(skip(store))]
    pub async fn find_by_id<S: FeedbackStore + ?Sized>(
        store: &S,
        id: FeedbackId,
    ) -> database::Result<Option<Self>> {
        store.find_feedback(id).await
    }

    /// Replaces title and content. Id and owner never change.
    ///
    /// Returns `false` if the feedback is gone from the store,
    /// `self` is left untouched in that case.
    #[tracing::instrument(skip_all, fields(id = %self.id))]
    pub async fn update<S: FeedbackStore + ?Sized>(
        &mut self,
        store: &S,
        input: &FeedbackInput,
    ) -> database::Result<bool> {
        let updated = store
            .update_feedback(self.id, &input.title, &input.content)
            .await?;

        if let Some(updated) = updated {
            *self = updated;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    #[tracing::instrument(skip_all, fields(id = %self.id))]
    pub async fn delete<S: FeedbackStore + ?Sized>(&self, store: &S) -> database::Result<bool> {
        store.delete_feedback(self.id).await
    }

    #[tracing::instrument(skip(store))]
    pub async fn list_by_owner<S: FeedbackStore + ?Sized>(
        store: &S,
        username: &str,
    ) -> database::Result<Vec<Self>> {
        store.list_feedback(username).await
    }
}
