//! Sharing requests repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{page::Page, request::ItemRequest},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestsRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> AppResult<ItemRequest>;

    /// Requests of one user, oldest first
    async fn list_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>>;

    /// Requests of everyone except `user_id`, newest first, windowed by `page`
    async fn list_others(&self, user_id: i64, page: Page) -> AppResult<Vec<ItemRequest>>;

    async fn create(
        &self,
        requester_id: i64,
        description: &str,
        created: DateTime<Utc>,
    ) -> AppResult<ItemRequest>;
}

pub(crate) fn request_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("ItemRequest with ID {} not found", id))
}

#[derive(Clone)]
pub struct PgRequestsRepository {
    pool: Pool<Postgres>,
}

impl PgRequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestsRepository for PgRequestsRepository {
    async fn get_by_id(&self, id: i64) -> AppResult<ItemRequest> {
        sqlx::query_as::<_, ItemRequest>(
            "SELECT id, requester_id, description, created FROM requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| request_not_found(id))
    }

    async fn list_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        let requests = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT id, requester_id, description, created
            FROM requests
            WHERE requester_id = $1
            ORDER BY created, id
            "#,
        )
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn list_others(&self, user_id: i64, page: Page) -> AppResult<Vec<ItemRequest>> {
        let requests = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT id, requester_id, description, created
            FROM requests
            WHERE requester_id != $1
            ORDER BY created DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.size)
        .bind(page.from)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn create(
        &self,
        requester_id: i64,
        description: &str,
        created: DateTime<Utc>,
    ) -> AppResult<ItemRequest> {
        let row = sqlx::query_as::<_, ItemRequest>(
            r#"
            INSERT INTO requests (requester_id, description, created)
            VALUES ($1, $2, $3)
            RETURNING id, requester_id, description, created
            "#,
        )
        .bind(requester_id)
        .bind(description)
        .bind(created)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
