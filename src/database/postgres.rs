use async_trait::async_trait;
use chrono::NaiveDateTime;
use error_stack::Report;
use sqlx::FromRow;

use super::{Error, ErrorExt, FeedbackStore, Pool, Result, UserStore};
use crate::{
    schema::{Feedback, NewFeedback, NewUser, User},
    types::id::FeedbackId,
};

/// [`Store`](super::Store) backed by the Postgres pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct FeedbackRow {
    id: i64,
    title: String,
    content: String,
    username: String,
    created_at: NaiveDateTime,
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = Report<Error>;

    fn try_from(row: FeedbackRow) -> std::result::Result<Self, Self::Error> {
        let id = FeedbackId::from_db(row.id).ok_or_else(|| {
            Report::new(Error::Internal).attach_printable(format!("invalid feedback id {}", row.id))
        })?;
        Ok(Self {
            id,
            title: row.title,
            content: row.content,
            username: row.username,
            created_at: row.created_at,
        })
    }
}

// Ids that cannot fit in a BIGSERIAL column cannot refer to any row.
fn bind_id(id: FeedbackId) -> Option<i64> {
    id.to_db()
}

#[async_trait]
impl UserStore for PgStore {
    #[tracing::instrument(skip_all, fields(username = user.username), name = "db.users.insert")]
    async fn insert_user(&self, user: NewUser<'_>) -> Result<User> {
        let mut conn = self.pool.get().await?;
        sqlx::query_as::<_, User>(
            r#"INSERT INTO "users" (username, password_hash, email, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *"#,
        )
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.email)
        .bind(user.first_name)
        .bind(user.last_name)
        .fetch_one(&mut *conn)
        .await
        .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "db.users.find")]
    async fn find_user(&self, username: &str) -> Result<Option<User>> {
        let mut conn = self.pool.get().await?;
        sqlx::query_as::<_, User>(r#"SELECT * FROM "users" WHERE username = $1"#)
            .bind(username)
            .fetch_optional(&mut *conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "db.users.delete")]
    async fn delete_user(&self, username: &str) -> Result<bool> {
        let mut transaction = self.pool.begin().await?;

        // Feedback goes first even though the foreign key cascades,
        // the whole removal must not depend on the schema.
        let feedback = sqlx::query(r#"DELETE FROM "feedbacks" WHERE username = $1"#)
            .bind(username)
            .execute(&mut *transaction)
            .await
            .into_db_error()?;

        let user = sqlx::query(r#"DELETE FROM "users" WHERE username = $1"#)
            .bind(username)
            .execute(&mut *transaction)
            .await
            .into_db_error()?;

        transaction.commit().await.into_db_error()?;
        tracing::debug!(
            feedback = feedback.rows_affected(),
            "deleted user with their feedback"
        );

        Ok(user.rows_affected() > 0)
    }
}

#[async_trait]
impl FeedbackStore for PgStore {
    #[tracing::instrument(
        skip_all,
        fields(username = feedback.username),
        name = "db.feedbacks.insert"
    )]
    async fn insert_feedback(&self, feedback: NewFeedback<'_>) -> Result<Feedback> {
        let mut conn = self.pool.get().await?;
        let row = sqlx::query_as::<_, FeedbackRow>(
            r#"INSERT INTO "feedbacks" (title, content, username)
            VALUES ($1, $2, $3)
            RETURNING *"#,
        )
        .bind(feedback.title)
        .bind(feedback.content)
        .bind(feedback.username)
        .fetch_one(&mut *conn)
        .await
        .into_db_error()?;

        row.try_into()
    }

    #[tracing::instrument(skip(self), name = "db.feedbacks.find")]
    async fn find_feedback(&self, id: FeedbackId) -> Result<Option<Feedback>> {
        let Some(id) = bind_id(id) else {
            return Ok(None);
        };

        let mut conn = self.pool.get().await?;
        sqlx::query_as::<_, FeedbackRow>(r#"SELECT * FROM "feedbacks" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .into_db_error()?
            .map(Feedback::try_from)
            .transpose()
    }

    #[tracing::instrument(skip(self, title, content), name = "db.feedbacks.update")]
    async fn update_feedback(
        &self,
        id: FeedbackId,
        title: &str,
        content: &str,
    ) -> Result<Option<Feedback>> {
        let Some(id) = bind_id(id) else {
            return Ok(None);
        };

        let mut conn = self.pool.get().await?;
        sqlx::query_as::<_, FeedbackRow>(
            r#"UPDATE "feedbacks" SET title = $2, content = $3
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_optional(&mut *conn)
        .await
        .into_db_error()?
        .map(Feedback::try_from)
        .transpose()
    }

    #[tracing::instrument(skip(self), name = "db.feedbacks.delete")]
    async fn delete_feedback(&self, id: FeedbackId) -> Result<bool> {
        let Some(id) = bind_id(id) else {
            return Ok(false);
        };

        let mut conn = self.pool.get().await?;
        let result = sqlx::query(r#"DELETE FROM "feedbacks" WHERE id = $1"#)
            .bind(id)
            .execute(&mut *conn)
            .await
            .into_db_error()?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), name = "db.feedbacks.list")]
    async fn list_feedback(&self, username: &str) -> Result<Vec<Feedback>> {
        let mut conn = self.pool.get().await?;
        sqlx::query_as::<_, FeedbackRow>(
            r#"SELECT * FROM "feedbacks" WHERE username = $1 ORDER BY created_at, id"#,
        )
        .bind(username)
        .fetch_all(&mut *conn)
        .await
        .into_db_error()?
        .into_iter()
        .map(Feedback::try_from)
        .collect()
    }
}
