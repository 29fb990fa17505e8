//! Repository layer: one trait per table, backed by PostgreSQL or memory

pub mod bookings;
pub mod comments;
pub mod items;
pub mod memory;
pub mod requests;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::error::AppResult;

pub use bookings::BookingsRepository;
pub use comments::CommentsRepository;
pub use items::ItemsRepository;
pub use memory::MemoryStore;
pub use requests::RequestsRepository;
pub use users::UsersRepository;

/// Store connectivity probe used by the readiness endpoint
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgHealth {
    pool: Pool<Postgres>,
}

#[async_trait]
impl StoreHealth for PgHealth {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Handles to every table, shared by all services
#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UsersRepository>,
    pub items: Arc<dyn ItemsRepository>,
    pub bookings: Arc<dyn BookingsRepository>,
    pub requests: Arc<dyn RequestsRepository>,
    pub comments: Arc<dyn CommentsRepository>,
    pub health: Arc<dyn StoreHealth>,
}

impl Repository {
    /// Create a repository over the given database pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            users: Arc::new(users::PgUsersRepository::new(pool.clone())),
            items: Arc::new(items::PgItemsRepository::new(pool.clone())),
            bookings: Arc::new(bookings::PgBookingsRepository::new(pool.clone())),
            requests: Arc::new(requests::PgRequestsRepository::new(pool.clone())),
            comments: Arc::new(comments::PgCommentsRepository::new(pool.clone())),
            health: Arc::new(PgHealth { pool }),
        }
    }

    /// Create a repository over a fresh, empty in-process store
    pub fn memory() -> Self {
        Self::from_memory(MemoryStore::default())
    }

    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            items: Arc::new(store.clone()),
            bookings: Arc::new(store.clone()),
            requests: Arc::new(store.clone()),
            comments: Arc::new(store.clone()),
            health: Arc::new(store),
        }
    }
}
