//! Items repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::item::{Item, NewItem},
};

const ITEM_COLUMNS: &str = "id, owner_id, name, description, available, request_id";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemsRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> AppResult<Item>;

    /// Items of one owner ordered by id
    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>>;

    /// Available items whose name or description contains `text`, ignoring case
    async fn search(&self, text: &str) -> AppResult<Vec<Item>>;

    /// Items answering any of the given requests, newest id first
    async fn list_by_requests(&self, request_ids: &[i64]) -> AppResult<Vec<Item>>;

    async fn create(&self, item: &NewItem) -> AppResult<Item>;

    /// Persist name, description and availability of an existing item
    async fn update(&self, item: &Item) -> AppResult<Item>;
}

/// Case-folded `LIKE` pattern matching `text` anywhere, with `%`, `_` and `\` taken literally
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn item_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Item with ID {} not found", id))
}

#[derive(Clone)]
pub struct PgItemsRepository {
    pool: Pool<Postgres>,
}

impl PgItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemsRepository for PgItemsRepository {
    async fn get_by_id(&self, id: i64) -> AppResult<Item> {
        let query = format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS);
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| item_not_found(id))
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>> {
        let query = format!(
            "SELECT {} FROM items WHERE owner_id = $1 ORDER BY id",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, Item>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        let pattern = contains_pattern(text);
        let query = format!(
            r#"
            SELECT {} FROM items
            WHERE available = TRUE
              AND (LOWER(name) LIKE $1 ESCAPE '\' OR LOWER(description) LIKE $1 ESCAPE '\')
            ORDER BY id
            "#,
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, Item>(&query)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn list_by_requests(&self, request_ids: &[i64]) -> AppResult<Vec<Item>> {
        if request_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {} FROM items WHERE request_id = ANY($1) ORDER BY id DESC",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, Item>(&query)
            .bind(request_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn create(&self, item: &NewItem) -> AppResult<Item> {
        let query = format!(
            r#"
            INSERT INTO items (owner_id, name, description, available, request_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        );
        let row = sqlx::query_as::<_, Item>(&query)
            .bind(item.owner_id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.available)
            .bind(item.request_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, item: &Item) -> AppResult<Item> {
        let query = format!(
            "UPDATE items SET name = $1, description = $2, available = $3 WHERE id = $4 RETURNING {}",
            ITEM_COLUMNS
        );
        sqlx::query_as::<_, Item>(&query)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.available)
            .bind(item.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| item_not_found(item.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Drill"), "%drill%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern(r"c:\d"), r"%c:\\d%");
    }
}
