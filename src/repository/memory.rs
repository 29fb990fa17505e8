//! In-process store implementing every repository trait.
//!
//! All tables live behind one lock, so each call sees a consistent snapshot.
//! Ids are handed out per table in insertion order, starting at 1.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{
    bookings::{booking_not_found, BookingsRepository},
    comments::CommentsRepository,
    items::{item_not_found, ItemsRepository},
    requests::{request_not_found, RequestsRepository},
    users::{user_not_found, UsersRepository},
    StoreHealth,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingStatus, NewBooking},
        comment::{CommentDetails, NewComment},
        item::{Item, NewItem},
        page::Page,
        request::ItemRequest,
        user::User,
    },
};

struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> &T {
        self.last_id += 1;
        let id = self.last_id;
        self.rows.entry(id).or_insert_with(|| build(id))
    }
}

#[derive(Debug, Clone)]
struct CommentRow {
    id: i64,
    item_id: i64,
    author_id: i64,
    text: String,
    created: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    items: Table<Item>,
    bookings: Table<Booking>,
    requests: Table<ItemRequest>,
    comments: Table<CommentRow>,
}

impl Tables {
    /// Join a comment with its author's name; a dangling author is a broken store
    fn comment_details(&self, row: &CommentRow) -> AppResult<CommentDetails> {
        let author = self.users.rows.get(&row.author_id).ok_or_else(|| {
            AppError::Internal(format!(
                "Comment {} references missing user {}",
                row.id, row.author_id
            ))
        })?;
        Ok(CommentDetails {
            id: row.id,
            item_id: row.item_id,
            text: row.text.clone(),
            author_name: author.name.clone(),
            created: row.created,
        })
    }

    fn owner_of(&self, item_id: i64) -> Option<i64> {
        self.items.rows.get(&item_id).map(|item| item.owner_id)
    }
}

/// Bookings sorted by start descending; `sort_by` is stable so ids stay ascending on ties
fn newest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.sort_by(|a, b| b.start.cmp(&a.start));
    bookings
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UsersRepository for MemoryStore {
    async fn get_by_id(&self, id: i64) -> AppResult<User> {
        let tables = self.tables.read().await;
        tables.users.rows.get(&id).cloned().ok_or_else(|| user_not_found(id))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().cloned().collect())
    }

    async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .any(|u| u.email == email && Some(u.id) != exclude_id))
    }

    async fn create(&self, name: &str, email: &str) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.rows.values().any(|u| u.email == email) {
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }
        let user = tables.users.insert_with(|id| User {
            id,
            name: name.to_string(),
            email: email.to_string(),
        });
        Ok(user.clone())
    }

    async fn update(&self, id: i64, name: &str, email: &str) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.rows.values().any(|u| u.email == email && u.id != id) {
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }
        let user = tables.users.rows.get_mut(&id).ok_or_else(|| user_not_found(id))?;
        user.name = name.to_string();
        user.email = email.to_string();
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.rows.remove(&id).is_none() {
            return Err(user_not_found(id));
        }

        let owned: Vec<i64> = tables
            .items
            .rows
            .values()
            .filter(|item| item.owner_id == id)
            .map(|item| item.id)
            .collect();
        let requested: Vec<i64> = tables
            .requests
            .rows
            .values()
            .filter(|request| request.requester_id == id)
            .map(|request| request.id)
            .collect();

        tables.items.rows.retain(|_, item| item.owner_id != id);
        tables
            .bookings
            .rows
            .retain(|_, b| b.booker_id != id && !owned.contains(&b.item_id));
        tables
            .comments
            .rows
            .retain(|_, c| c.author_id != id && !owned.contains(&c.item_id));
        tables.requests.rows.retain(|_, r| r.requester_id != id);
        for item in tables.items.rows.values_mut() {
            if item.request_id.is_some_and(|r| requested.contains(&r)) {
                item.request_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ItemsRepository for MemoryStore {
    async fn get_by_id(&self, id: i64) -> AppResult<Item> {
        let tables = self.tables.read().await;
        tables.items.rows.get(&id).cloned().ok_or_else(|| item_not_found(id))
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .rows
            .values()
            .filter(|item| item.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        let needle = text.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .rows
            .values()
            .filter(|item| {
                item.available
                    && (item.name.to_lowercase().contains(&needle)
                        || item.description.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn list_by_requests(&self, request_ids: &[i64]) -> AppResult<Vec<Item>> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .rows
            .values()
            .rev()
            .filter(|item| item.request_id.is_some_and(|r| request_ids.contains(&r)))
            .cloned()
            .collect())
    }

    async fn create(&self, item: &NewItem) -> AppResult<Item> {
        let mut tables = self.tables.write().await;
        let created = tables.items.insert_with(|id| Item {
            id,
            owner_id: item.owner_id,
            name: item.name.clone(),
            description: item.description.clone(),
            available: item.available,
            request_id: item.request_id,
        });
        Ok(created.clone())
    }

    async fn update(&self, item: &Item) -> AppResult<Item> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .items
            .rows
            .get_mut(&item.id)
            .ok_or_else(|| item_not_found(item.id))?;
        stored.name = item.name.clone();
        stored.description = item.description.clone();
        stored.available = item.available;
        Ok(stored.clone())
    }
}

#[async_trait]
impl BookingsRepository for MemoryStore {
    async fn get_by_id(&self, id: i64) -> AppResult<Booking> {
        let tables = self.tables.read().await;
        tables.bookings.rows.get(&id).cloned().ok_or_else(|| booking_not_found(id))
    }

    async fn list_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .bookings
                .rows
                .values()
                .filter(|b| b.booker_id == booker_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .bookings
                .rows
                .values()
                .filter(|b| tables.owner_of(b.item_id) == Some(owner_id))
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_items(&self, item_ids: &[i64]) -> AppResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .rows
            .values()
            .filter(|b| item_ids.contains(&b.item_id))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.start);
        Ok(bookings)
    }

    async fn has_completed_booking(
        &self,
        item_id: i64,
        booker_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.bookings.rows.values().any(|b| {
            b.item_id == item_id
                && b.booker_id == booker_id
                && b.status == BookingStatus::Approved
                && b.end < now
        }))
    }

    async fn create(&self, booking: &NewBooking) -> AppResult<Booking> {
        let mut tables = self.tables.write().await;
        let created = tables.bookings.insert_with(|id| Booking {
            id,
            item_id: booking.item_id,
            booker_id: booking.booker_id,
            start: booking.start,
            end: booking.end,
            status: booking.status,
        });
        Ok(created.clone())
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> AppResult<Booking> {
        let mut tables = self.tables.write().await;
        let booking = tables
            .bookings
            .rows
            .get_mut(&id)
            .ok_or_else(|| booking_not_found(id))?;
        booking.status = status;
        Ok(booking.clone())
    }
}

#[async_trait]
impl RequestsRepository for MemoryStore {
    async fn get_by_id(&self, id: i64) -> AppResult<ItemRequest> {
        let tables = self.tables.read().await;
        tables.requests.rows.get(&id).cloned().ok_or_else(|| request_not_found(id))
    }

    async fn list_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        let tables = self.tables.read().await;
        let mut requests: Vec<ItemRequest> = tables
            .requests
            .rows
            .values()
            .filter(|r| r.requester_id == requester_id)
            .cloned()
            .collect();
        requests.sort_by_key(|r| r.created);
        Ok(requests)
    }

    async fn list_others(&self, user_id: i64, page: Page) -> AppResult<Vec<ItemRequest>> {
        let tables = self.tables.read().await;
        let mut requests: Vec<ItemRequest> = tables
            .requests
            .rows
            .values()
            .rev()
            .filter(|r| r.requester_id != user_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(page.apply(requests))
    }

    async fn create(
        &self,
        requester_id: i64,
        description: &str,
        created: DateTime<Utc>,
    ) -> AppResult<ItemRequest> {
        let mut tables = self.tables.write().await;
        let request = tables.requests.insert_with(|id| ItemRequest {
            id,
            requester_id,
            description: description.to_string(),
            created,
        });
        Ok(request.clone())
    }
}

#[async_trait]
impl CommentsRepository for MemoryStore {
    async fn create(&self, comment: &NewComment) -> AppResult<CommentDetails> {
        let mut tables = self.tables.write().await;
        if !tables.users.rows.contains_key(&comment.author_id) {
            return Err(AppError::Internal(format!(
                "Comment author {} does not exist",
                comment.author_id
            )));
        }
        let row = tables
            .comments
            .insert_with(|id| CommentRow {
                id,
                item_id: comment.item_id,
                author_id: comment.author_id,
                text: comment.text.clone(),
                created: comment.created,
            })
            .clone();
        tables.comment_details(&row)
    }

    async fn list_by_items(&self, item_ids: &[i64]) -> AppResult<Vec<CommentDetails>> {
        let tables = self.tables.read().await;
        let mut comments: Vec<CommentDetails> = tables
            .comments
            .rows
            .values()
            .rev()
            .filter(|c| item_ids.contains(&c.item_id))
            .map(|c| tables.comment_details(c))
            .collect::<AppResult<_>>()?;
        comments.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn ids_follow_insertion_order() {
        let store = MemoryStore::default();
        let first = UsersRepository::create(&store, "Ann", "ann@example.com").await.unwrap();
        let second = UsersRepository::create(&store, "Bob", "bob@example.com").await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::default();
        UsersRepository::create(&store, "Ann", "ann@example.com").await.unwrap();
        let err = UsersRepository::create(&store, "Ann 2", "ann@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_a_user_cascades() {
        let store = MemoryStore::default();
        let owner = UsersRepository::create(&store, "Owner", "owner@example.com").await.unwrap();
        let booker = UsersRepository::create(&store, "Booker", "booker@example.com").await.unwrap();
        let item = ItemsRepository::create(
            &store,
            &NewItem {
                owner_id: owner.id,
                name: "Drill".into(),
                description: "Cordless drill".into(),
                available: true,
                request_id: None,
            },
        )
        .await
        .unwrap();
        let now = Utc::now();
        BookingsRepository::create(
            &store,
            &NewBooking {
                item_id: item.id,
                booker_id: booker.id,
                start: now + Duration::hours(1),
                end: now + Duration::hours(2),
                status: BookingStatus::Waiting,
            },
        )
        .await
        .unwrap();

        UsersRepository::delete(&store, owner.id).await.unwrap();

        assert!(ItemsRepository::get_by_id(&store, item.id).await.is_err());
        assert!(store.list_by_booker(booker.id).await.unwrap().is_empty());
        assert!(matches!(
            UsersRepository::delete(&store, owner.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn booker_listing_breaks_start_ties_by_id() {
        let store = MemoryStore::default();
        let start = Utc::now() + Duration::days(1);
        for _ in 0..3 {
            BookingsRepository::create(
                &store,
                &NewBooking {
                    item_id: 1,
                    booker_id: 7,
                    start,
                    end: start + Duration::hours(1),
                    status: BookingStatus::Waiting,
                },
            )
            .await
            .unwrap();
        }
        let ids: Vec<i64> = store.list_by_booker(7).await.unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn comment_by_unknown_author_is_an_internal_error() {
        let store = MemoryStore::default();
        let err = CommentsRepository::create(
            &store,
            &NewComment {
                item_id: 1,
                author_id: 42,
                text: "Great".into(),
                created: Utc::now(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(CommentsRepository::list_by_items(&store, &[1]).await.unwrap().is_empty());
    }
}
