//! Comments repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::comment::{CommentDetails, NewComment},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentsRepository: Send + Sync {
    async fn create(&self, comment: &NewComment) -> AppResult<CommentDetails>;

    /// Comments on the given items, newest first
    async fn list_by_items(&self, item_ids: &[i64]) -> AppResult<Vec<CommentDetails>>;
}

#[derive(Clone)]
pub struct PgCommentsRepository {
    pool: Pool<Postgres>,
}

impl PgCommentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentsRepository for PgCommentsRepository {
    async fn create(&self, comment: &NewComment) -> AppResult<CommentDetails> {
        let row = sqlx::query_as::<_, CommentDetails>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (item_id, author_id, text, created)
                VALUES ($1, $2, $3, $4)
                RETURNING id, item_id, author_id, text, created
            )
            SELECT c.id, c.item_id, c.text, u.name AS author_name, c.created
            FROM inserted c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(comment.item_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.created)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_by_items(&self, item_ids: &[i64]) -> AppResult<Vec<CommentDetails>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let comments = sqlx::query_as::<_, CommentDetails>(
            r#"
            SELECT c.id, c.item_id, c.text, u.name AS author_name, c.created
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.item_id = ANY($1)
            ORDER BY c.created DESC, c.id DESC
            "#,
        )
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }
}
