//! Booking creation, approval and state-filtered listings

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingDetails, BookingState, BookingStatus, CreateBooking, NewBooking},
        item::Item,
        page::Page,
    },
    repository::Repository,
};

/// Keep the bookings in `state`, newest start first, then window by `page`.
///
/// The sort is stable, so bookings sharing a start keep their incoming
/// (insertion) order.
pub fn filter_bookings(
    bookings: Vec<Booking>,
    state: BookingState,
    now: DateTime<Utc>,
    page: Option<Page>,
) -> Vec<Booking> {
    let mut selected: Vec<Booking> = bookings
        .into_iter()
        .filter(|b| state.matches(b, now))
        .collect();
    selected.sort_by(|a, b| b.start.cmp(&a.start));
    match page {
        Some(page) => page.apply(selected),
        None => selected,
    }
}

/// Creation rules, checked in order; the first failure wins
fn check_new_booking(
    item: &Item,
    booker_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if !item.available {
        return Err(AppError::Validation(format!("Item with ID {} isn't available", item.id)));
    }
    if item.owner_id == booker_id {
        return Err(AppError::NotFound("Owner can not book his own item".to_string()));
    }
    if start >= end {
        return Err(AppError::Validation("Start has to be before end".to_string()));
    }
    if start < now {
        return Err(AppError::Validation("Start in the past".to_string()));
    }
    if end < now {
        return Err(AppError::Validation("End in the past".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
}

impl BookingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create_booking(&self, booker_id: i64, request: CreateBooking) -> AppResult<BookingDetails> {
        self.repository.users.get_by_id(booker_id).await?;
        let item_id = request
            .item_id
            .ok_or_else(|| AppError::Validation("Item id has to be set".to_string()))?;
        let item = self.repository.items.get_by_id(item_id).await?;
        let (start, end) = match (request.start, request.end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(AppError::Validation(
                    "Start and end have to be set".to_string(),
                ))
            }
        };

        check_new_booking(&item, booker_id, start, end, Utc::now())?;

        let booking = self
            .repository
            .bookings
            .create(&NewBooking {
                item_id,
                booker_id,
                start,
                end,
                status: BookingStatus::Waiting,
            })
            .await?;
        tracing::info!("Booking {} created for item {}", booking.id, item_id);
        Ok(BookingDetails::new(booking, item.name))
    }

    /// Owner's decision on a waiting booking
    pub async fn approve_booking(
        &self,
        booking_id: i64,
        owner_id: i64,
        approved: bool,
    ) -> AppResult<BookingDetails> {
        let booking = self.repository.bookings.get_by_id(booking_id).await?;
        let item = self.repository.items.get_by_id(booking.item_id).await?;

        if item.owner_id != owner_id {
            return Err(AppError::NotFound(format!(
                "Booking with ID {} not found for owner {}",
                booking_id, owner_id
            )));
        }
        if booking.status != BookingStatus::Waiting {
            return Err(AppError::Validation(format!(
                "Booking with ID {} is already {}",
                booking_id, booking.status
            )));
        }

        let status = if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };
        let updated = self.repository.bookings.update_status(booking_id, status).await?;
        tracing::info!("Booking {} set to {}", booking_id, status);
        Ok(BookingDetails::new(updated, item.name))
    }

    /// Visible to the booker and to the item owner only
    pub async fn get_booking(&self, booking_id: i64, user_id: i64) -> AppResult<BookingDetails> {
        self.repository.users.get_by_id(user_id).await?;
        let booking = self.repository.bookings.get_by_id(booking_id).await?;
        let item = self.repository.items.get_by_id(booking.item_id).await?;

        if booking.booker_id != user_id && item.owner_id != user_id {
            return Err(AppError::NotFound(format!(
                "Booking with ID {} not found",
                booking_id
            )));
        }
        Ok(BookingDetails::new(booking, item.name))
    }

    pub async fn list_for_booker(
        &self,
        booker_id: i64,
        state: BookingState,
        page: Option<Page>,
    ) -> AppResult<Vec<BookingDetails>> {
        self.repository.users.get_by_id(booker_id).await?;
        let bookings = self.repository.bookings.list_by_booker(booker_id).await?;
        self.present(filter_bookings(bookings, state, Utc::now(), page)).await
    }

    pub async fn list_for_owner(
        &self,
        owner_id: i64,
        state: BookingState,
        page: Option<Page>,
    ) -> AppResult<Vec<BookingDetails>> {
        self.repository.users.get_by_id(owner_id).await?;
        let bookings = self.repository.bookings.list_by_owner(owner_id).await?;
        self.present(filter_bookings(bookings, state, Utc::now(), page)).await
    }

    /// Attach item names, looking each item up once
    async fn present(&self, bookings: Vec<Booking>) -> AppResult<Vec<BookingDetails>> {
        let mut names: HashMap<i64, String> = HashMap::new();
        let mut result = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let name = match names.get(&booking.item_id) {
                Some(name) => name.clone(),
                None => {
                    let item = self.repository.items.get_by_id(booking.item_id).await?;
                    names.insert(item.id, item.name.clone());
                    item.name
                }
            };
            result.push(BookingDetails::new(booking, name));
        }
        Ok(result)
    }
}
