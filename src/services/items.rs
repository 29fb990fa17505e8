//! Item listing, search and comments

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingShort, BookingStatus},
        comment::{CommentDetails, CreateComment, NewComment},
        item::{CreateItem, Item, ItemDetails, NewItem, UpdateItem},
    },
    repository::Repository,
};

use super::validation::{non_blank, require_text};

#[derive(Clone)]
pub struct ItemsService {
    repository: Repository,
}

/// Latest booking that ended before `now` and earliest one starting after it.
/// Rejected and canceled bookings are not taken into account.
pub fn neighbouring_bookings(
    bookings: &[Booking],
    item_id: i64,
    now: DateTime<Utc>,
) -> (Option<BookingShort>, Option<BookingShort>) {
    let relevant = || {
        bookings.iter().filter(move |b| {
            b.item_id == item_id
                && !matches!(b.status, BookingStatus::Rejected | BookingStatus::Canceled)
        })
    };
    let last = relevant().filter(|b| b.end < now).max_by_key(|b| b.end);
    let next = relevant().filter(|b| b.start > now).min_by_key(|b| b.start);
    (last.map(BookingShort::from), next.map(BookingShort::from))
}

impl ItemsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create_item(&self, owner_id: i64, item: CreateItem) -> AppResult<Item> {
        self.repository.users.get_by_id(owner_id).await?;

        let name = require_text(item.name.as_deref(), "Name has to be not empty")?;
        let description =
            require_text(item.description.as_deref(), "Description has to be not empty")?;
        let available = item
            .available
            .ok_or_else(|| AppError::Validation("Available has to be set".to_string()))?;
        if let Some(request_id) = item.request_id {
            self.repository.requests.get_by_id(request_id).await?;
        }

        let created = self
            .repository
            .items
            .create(&NewItem {
                owner_id,
                name,
                description,
                available,
                request_id: item.request_id,
            })
            .await?;
        tracing::info!("Item {} created by user {}", created.id, owner_id);
        Ok(created)
    }

    pub async fn update_item(&self, item_id: i64, user_id: i64, update: UpdateItem) -> AppResult<Item> {
        self.repository.users.get_by_id(user_id).await?;
        let mut item = self.repository.items.get_by_id(item_id).await?;
        if item.owner_id != user_id {
            return Err(AppError::NotFound(format!(
                "Item with ID {} not found for user {}",
                item_id, user_id
            )));
        }

        if let Some(name) = non_blank(update.name.as_deref()) {
            item.name = name;
        }
        if let Some(description) = non_blank(update.description.as_deref()) {
            item.description = description;
        }
        if let Some(available) = update.available {
            item.available = available;
        }

        let updated = self.repository.items.update(&item).await?;
        tracing::info!("Item {} updated", item_id);
        Ok(updated)
    }

    /// Item with comments; the owner also sees last/next booking
    pub async fn get_item(&self, item_id: i64, user_id: i64) -> AppResult<ItemDetails> {
        let item = self.repository.items.get_by_id(item_id).await?;
        self.repository.users.get_by_id(user_id).await?;

        let comments = self.repository.comments.list_by_items(&[item_id]).await?;
        let is_owner = item.owner_id == user_id;
        let mut details = ItemDetails::new(item, comments);

        if is_owner {
            let bookings = self.repository.bookings.list_by_items(&[item_id]).await?;
            let (last, next) = neighbouring_bookings(&bookings, item_id, Utc::now());
            details.last_booking = last;
            details.next_booking = next;
        }
        Ok(details)
    }

    /// All items of the owner, ordered by id
    pub async fn list_owner_items(&self, owner_id: i64) -> AppResult<Vec<ItemDetails>> {
        self.repository.users.get_by_id(owner_id).await?;
        let items = self.repository.items.list_by_owner(owner_id).await?;
        let ids: Vec<i64> = items.iter().map(|item| item.id).collect();

        let comments = self.repository.comments.list_by_items(&ids).await?;
        let bookings = self.repository.bookings.list_by_items(&ids).await?;
        let now = Utc::now();

        Ok(items
            .into_iter()
            .map(|item| {
                let item_comments: Vec<CommentDetails> = comments
                    .iter()
                    .filter(|c| c.item_id == item.id)
                    .cloned()
                    .collect();
                let (last, next) = neighbouring_bookings(&bookings, item.id, now);
                let mut details = ItemDetails::new(item, item_comments);
                details.last_booking = last;
                details.next_booking = next;
                details
            })
            .collect())
    }

    pub async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.repository.items.search(text).await
    }

    pub async fn add_comment(
        &self,
        item_id: i64,
        author_id: i64,
        comment: CreateComment,
    ) -> AppResult<CommentDetails> {
        self.repository.users.get_by_id(author_id).await?;
        self.repository.items.get_by_id(item_id).await?;
        let text = require_text(comment.text.as_deref(), "Empty comment")?;

        let now = Utc::now();
        let has_booked = self
            .repository
            .bookings
            .has_completed_booking(item_id, author_id, now)
            .await?;
        if !has_booked {
            return Err(AppError::Validation(format!(
                "User {} has no completed booking of item {}",
                author_id, item_id
            )));
        }

        let created = self
            .repository
            .comments
            .create(&NewComment {
                item_id,
                author_id,
                text,
                created: now,
            })
            .await?;
        tracing::info!("Comment {} added to item {}", created.id, item_id);
        Ok(created)
    }
}
